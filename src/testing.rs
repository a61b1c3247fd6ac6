use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::{WorkerError, WorkerResult};
use crate::infrastructure::queue::{JobQueue, QueueMessage};
use crate::infrastructure::storage::ObjectStore;

pub fn png_bytes(color: [u8; 4]) -> Bytes {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba(color)));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    Bytes::from(buf.into_inner())
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueueMessage>,
    acknowledged: Vec<String>,
    fail_acks: bool,
    fail_receive: bool,
}

#[derive(Clone, Default)]
pub struct FakeQueue {
    state: Arc<Mutex<QueueState>>,
}

impl FakeQueue {
    pub fn push(&self, body: &str, receipt_handle: &str) {
        self.state.lock().unwrap().pending.push_back(QueueMessage {
            body: body.to_string(),
            receipt_handle: receipt_handle.to_string(),
        });
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.state.lock().unwrap().acknowledged.clone()
    }

    pub fn fail_acks(&self, fail: bool) {
        self.state.lock().unwrap().fail_acks = fail;
    }

    pub fn fail_receive(&self, fail: bool) {
        self.state.lock().unwrap().fail_receive = fail;
    }
}

#[async_trait]
impl JobQueue for FakeQueue {
    async fn receive(&self) -> WorkerResult<QueueMessage> {
        let mut state = self.state.lock().unwrap();
        if state.fail_receive {
            return Err(WorkerError::transport("connection reset"));
        }
        state
            .pending
            .pop_front()
            .ok_or(WorkerError::NoMessageAvailable)
    }

    async fn acknowledge(&self, receipt_handle: &str) -> WorkerResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_acks {
            return Err(WorkerError::transport("DeleteMessage timed out"));
        }
        state.acknowledged.push(receipt_handle.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Fetch(String),
    Upload(String),
    Delete(String),
}

#[derive(Default)]
struct StoreState {
    objects: HashMap<String, Bytes>,
    content_types: HashMap<String, String>,
    calls: Vec<StoreCall>,
    fail_uploads: bool,
    consume_uploads: bool,
}

#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeStore {
    pub fn insert(&self, key: &str, data: Bytes) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(key.to_string(), data);
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.state.lock().unwrap().objects.get(key).cloned()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().content_types.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.lock().unwrap().objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.state.lock().unwrap().fail_uploads = fail;
    }

    // Deletes the local file once it is uploaded, so the worker's own cleanup fails.
    pub fn consume_uploads(&self, consume: bool) {
        self.state.lock().unwrap().consume_uploads = consume;
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn fetch(&self, key: &str) -> WorkerResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Fetch(key.to_string()));
        state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| WorkerError::fetch(format!("404 Not Found: {}", key)))
    }

    async fn upload_public(&self, path: &Path, key: &str, content_type: &str) -> WorkerResult<()> {
        let data = std::fs::read(path).map_err(|e| WorkerError::storage_write(e.to_string()))?;

        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Upload(key.to_string()));
        if state.fail_uploads {
            return Err(WorkerError::storage_write("503 Slow Down"));
        }
        state.objects.insert(key.to_string(), Bytes::from(data));
        state
            .content_types
            .insert(key.to_string(), content_type.to_string());
        if state.consume_uploads {
            std::fs::remove_file(path).map_err(|e| WorkerError::storage_write(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> WorkerResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Delete(key.to_string()));
        state
            .objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| WorkerError::storage_delete(format!("{} does not exist", key)))
    }
}
