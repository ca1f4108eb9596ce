// Copyright 2026. The Dagchain Core Contributors
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! LMDB-backed key/value columns: `default`, `ms`, `utxo`, `reg`, `info`.
//!
//! Built directly on `lmdb-zero` rather than a `LMDBBuilder`/`LMDBDatabase`
//! wrapper crate, since that wrapper pulls in a path dependency this crate
//! doesn't otherwise need.

use std::path::Path;
use std::sync::Arc;

use lmdb_zero as lmdb;
use lmdb_zero::traits::CreateCursor;

use crate::error::StoreError;

const DATABASES: &[&str] = &["default", "ms", "utxo", "reg", "info"];

pub struct KvStore {
    env: Arc<lmdb::Environment>,
    default: lmdb::Database<'static>,
    ms: lmdb::Database<'static>,
    utxo: lmdb::Database<'static>,
    reg: lmdb::Database<'static>,
    info: lmdb::Database<'static>,
}

/// Columns of the key/value index: `default`, `ms`, `utxo`, `reg`, `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Default,
    Ms,
    Utxo,
    Reg,
    Info,
}

impl KvStore {
    pub fn open(path: &Path, environment_size_mb: usize) -> Result<KvStore, StoreError> {
        std::fs::create_dir_all(path)?;
        let mut builder = lmdb::EnvBuilder::new().map_err(|e| StoreError::Kv(e.to_string()))?;
        builder
            .set_mapsize(environment_size_mb * 1024 * 1024)
            .map_err(|e| StoreError::Kv(e.to_string()))?;
        builder
            .set_maxdbs(DATABASES.len() as u32)
            .map_err(|e| StoreError::Kv(e.to_string()))?;
        let env = unsafe {
            builder
                .open(path.to_str().ok_or_else(|| StoreError::Kv("non-utf8 path".into()))?, lmdb::open::Flags::empty(), 0o600)
                .map_err(|e| StoreError::Kv(e.to_string()))?
        };
        let env = Arc::new(env);

        let open_db = |name: &str| -> Result<lmdb::Database<'static>, StoreError> {
            let db = lmdb::Database::open(env.clone(), Some(name), &lmdb::DatabaseOptions::new(lmdb::db::CREATE))
                .map_err(|e| StoreError::Kv(e.to_string()))?;
            Ok(db)
        };

        Ok(KvStore {
            env: env.clone(),
            default: open_db("default")?,
            ms: open_db("ms")?,
            utxo: open_db("utxo")?,
            reg: open_db("reg")?,
            info: open_db("info")?,
        })
    }

    fn db(&self, column: Column) -> &lmdb::Database<'static> {
        match column {
            Column::Default => &self.default,
            Column::Ms => &self.ms,
            Column::Utxo => &self.utxo,
            Column::Reg => &self.reg,
            Column::Info => &self.info,
        }
    }

    pub fn put(&self, column: Column, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let txn = lmdb::WriteTransaction::new(self.env.clone()).map_err(|e| StoreError::Kv(e.to_string()))?;
        {
            let mut access = txn.access();
            access
                .put(self.db(column), key, value, lmdb::put::Flags::empty())
                .map_err(|e| StoreError::Kv(e.to_string()))?;
        }
        txn.commit().map_err(|e| StoreError::Kv(e.to_string()))
    }

    pub fn get(&self, column: Column, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = lmdb::ReadTransaction::new(self.env.clone()).map_err(|e| StoreError::Kv(e.to_string()))?;
        let access = txn.access();
        match access.get::<[u8], [u8]>(self.db(column), key) {
            Ok(bytes) => Ok(Some(bytes.to_vec())),
            Err(lmdb::Error::Code(lmdb::error::NOTFOUND)) => Ok(None),
            Err(e) => Err(StoreError::Kv(e.to_string())),
        }
    }

    pub fn delete(&self, column: Column, key: &[u8]) -> Result<(), StoreError> {
        let txn = lmdb::WriteTransaction::new(self.env.clone()).map_err(|e| StoreError::Kv(e.to_string()))?;
        {
            let mut access = txn.access();
            match access.del_key(self.db(column), key) {
                Ok(()) | Err(lmdb::Error::Code(lmdb::error::NOTFOUND)) => {}
                Err(e) => return Err(StoreError::Kv(e.to_string())),
            }
        }
        txn.commit().map_err(|e| StoreError::Kv(e.to_string()))
    }

    /// Deletes every entry whose key is strictly greater than `height_key`,
    /// used by `check_file_sanity`'s prune path to roll `ms`/`default` back
    /// to the last consistently-persisted height.
    pub fn delete_keys_above(&self, column: Column, height_key: &[u8]) -> Result<usize, StoreError> {
        let txn = lmdb::WriteTransaction::new(self.env.clone()).map_err(|e| StoreError::Kv(e.to_string()))?;
        let mut removed = 0usize;
        {
            let mut cursor = txn.cursor(self.db(column)).map_err(|e| StoreError::Kv(e.to_string()))?;
            let mut access = txn.access();
            let mut to_remove = Vec::new();
            if let Ok((k, _v)) = cursor.seek_range_k::<[u8], [u8]>(&access, height_key) {
                to_remove.push(k.to_vec());
            }
            while let Ok((k, _v)) = cursor.next::<[u8], [u8]>(&access) {
                to_remove.push(k.to_vec());
            }
            for k in to_remove {
                let _ = access.del_key(self.db(column), k.as_slice());
                removed += 1;
            }
        }
        txn.commit().map_err(|e| StoreError::Kv(e.to_string()))?;
        Ok(removed)
    }

    pub fn get_info_u64(&self, key: &str) -> Result<Option<u64>, StoreError> {
        match self.get(Column::Info, key.as_bytes())? {
            Some(bytes) if bytes.len() == 8 => {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes);
                Ok(Some(u64::from_le_bytes(arr)))
            }
            Some(_) => Err(StoreError::Corrupt {
                reason: format!("info key {} has unexpected width", key),
            }),
            None => Ok(None),
        }
    }

    pub fn put_info_u64(&self, key: &str, value: u64) -> Result<(), StoreError> {
        self.put(Column::Info, key.as_bytes(), &value.to_le_bytes())
    }
}
