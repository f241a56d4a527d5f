//! 集成测试共用的 mock 后端与 mock 缓存
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use iplocation::cache::{CachedLookup, LocationCache};
use iplocation::errors::{IpLocationError, Result};
use iplocation::storage::{LocationRecord, StoreConnection, StoreConnector};

/// mock 数据库的共享状态：数据行、调用计数和故障开关
#[derive(Debug, Default)]
pub struct MockBackend {
    pub rows: Mutex<HashMap<String, LocationRecord>>,
    pub connects: AtomicUsize,
    pub lookups: AtomicUsize,
    pub fail_connect: AtomicBool,
    pub fail_query: AtomicBool,
    /// 小于该代数的连接视为已被服务端断开
    min_open_generation: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(MockBackend::default())
    }

    pub fn insert_row(&self, record: LocationRecord) {
        self.rows.lock().insert(record.ip.clone(), record);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// 模拟服务端断开所有既有连接；之后新建的连接不受影响
    pub fn drop_existing_connections(&self) {
        self.min_open_generation
            .store(self.connects.load(Ordering::SeqCst), Ordering::SeqCst);
    }
}

pub struct MockConnector {
    pub backend: Arc<MockBackend>,
}

impl MockConnector {
    pub fn new(backend: Arc<MockBackend>) -> Arc<Self> {
        Arc::new(MockConnector { backend })
    }
}

#[async_trait]
impl StoreConnector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>> {
        if self.backend.fail_connect.load(Ordering::SeqCst) {
            return Err(IpLocationError::database_connection("mock connect failure"));
        }
        let generation = self.backend.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            backend: self.backend.clone(),
            generation,
            open: AtomicBool::new(true),
        }))
    }
}

#[derive(Debug)]
pub struct MockConnection {
    backend: Arc<MockBackend>,
    generation: usize,
    open: AtomicBool,
}

impl MockConnection {
    /// 直接构造一条游离的 mock 连接（用于 release 行为测试）
    pub fn detached(backend: Arc<MockBackend>, open: bool) -> Box<dyn StoreConnection> {
        let generation = backend.connects.load(Ordering::SeqCst);
        Box::new(MockConnection {
            backend,
            generation,
            open: AtomicBool::new(open),
        })
    }
}

#[async_trait]
impl StoreConnection for MockConnection {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
            && self.generation >= self.backend.min_open_generation.load(Ordering::SeqCst)
    }

    async fn ping(&self) -> Result<()> {
        if self.backend.fail_query.load(Ordering::SeqCst) {
            self.open.store(false, Ordering::SeqCst);
            return Err(IpLocationError::database_operation("mock ping failure"));
        }
        Ok(())
    }

    async fn lookup_ip(&self, ip: &str) -> Result<Option<LocationRecord>> {
        if self.backend.fail_query.load(Ordering::SeqCst) {
            self.open.store(false, Ordering::SeqCst);
            return Err(IpLocationError::database_operation("mock query failure"));
        }
        self.backend.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.backend.rows.lock().get(ip).cloned())
    }
}

/// 记录每次写入（含 TTL）的内存缓存
#[derive(Default)]
pub struct RecordingCache {
    pub entries: Mutex<HashMap<String, (CachedLookup, u64)>>,
}

impl RecordingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingCache::default())
    }

    pub fn ttl_for(&self, ip: &str) -> Option<u64> {
        self.entries.lock().get(ip).map(|(_, ttl)| *ttl)
    }
}

#[async_trait]
impl LocationCache for RecordingCache {
    async fn get(&self, ip: &str) -> Option<CachedLookup> {
        self.entries.lock().get(ip).map(|(value, _)| value.clone())
    }

    async fn set(&self, ip: &str, value: &CachedLookup, ttl_seconds: u64) {
        self.entries
            .lock()
            .insert(ip.to_string(), (value.clone(), ttl_seconds));
    }

    async fn ping(&self) -> bool {
        true
    }
}

pub fn sample_record(ip: &str) -> LocationRecord {
    LocationRecord {
        ip: ip.to_string(),
        country: Some("US".to_string()),
        city: Some("Mountain View".to_string()),
        region: Some("California".to_string()),
        latitude: Some(37.386),
        longitude: Some(-122.0838),
        postal_code: Some("94035".to_string()),
        timezone: Some("America/Los_Angeles".to_string()),
    }
}
