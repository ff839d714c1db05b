#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use solace_core::models::message::Message;
use solace_core::models::patient::Patient;
use solace_practice::dispatch::{LoggingDispatcher, MessageDispatcher};
use solace_practice::messaging::MessagingService;
use solace_storage::SharedStore;
use solace_storage::memory::MemoryStore;

pub struct RejectingDispatcher;

#[async_trait]
impl MessageDispatcher for RejectingDispatcher {
    async fn dispatch(&self, _patient: &Patient, _message: &Message) -> Result<(), String> {
        Err("gateway timeout".to_string())
    }
}

pub fn store() -> SharedStore {
    Arc::new(MemoryStore::new())
}

pub fn service(store: &SharedStore) -> MessagingService {
    MessagingService::new(store.clone(), Arc::new(LoggingDispatcher))
}

pub fn patient(first: &str, last: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: jiff::civil::date(1990, 6, 1),
        email: Some(format!("{}@example.com", first.to_lowercase())),
        phone: Some("+15555550199".to_string()),
        fax: None,
        portal_enabled: false,
        diagnoses: Vec::new(),
        created_at: jiff::Timestamp::now(),
    }
}
