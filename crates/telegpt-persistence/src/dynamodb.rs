//! DynamoDB backend.
//!
//! The table holds one item keyed by `field = "messages"`:
//!
//! ```text
//! { "field": S("messages"),
//!   "messages": L([ M({"role": S("user"), "content": S("...")}), ... ]) }
//! ```
//!
//! Writes only `SET` the `messages` attribute, so any other attributes on a
//! pre-provisioned item survive.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::update_item::builders::UpdateItemFluentBuilder;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use telegpt_models::{ConversationRecord, Role, Turn, RECORD_KEY_FIELD, RECORD_KEY_VALUE};
use tracing::debug;

use crate::backend::RecordBackend;
use crate::error::{PersistenceError, Result};

const MESSAGES_ATTR: &str = "messages";
const ROLE_ATTR: &str = "role";
const CONTENT_ATTR: &str = "content";

const UPDATE_EXPRESSION: &str = "SET #messages = :messages";

/// Reads and writes the conversation item of a DynamoDB table.
pub struct DynamoDbBackend {
    client: Client,
    table: String,
}

impl DynamoDbBackend {
    /// Creates a backend from an existing SDK client.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Builds a client for `region` using the default AWS credential chain.
    pub async fn connect(region: &str, table: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config), table)
    }

    /// Name of the table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Upsert of the record's `messages` attribute. Creates the item when
    /// absent and leaves its other attributes untouched.
    fn update_request(&self, record: &ConversationRecord) -> UpdateItemFluentBuilder {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(RECORD_KEY_FIELD, AttributeValue::S(record.field.clone()))
            .update_expression(UPDATE_EXPRESSION)
            .expression_attribute_names("#messages", MESSAGES_ATTR)
            .expression_attribute_values(":messages", messages_attribute(record))
    }
}

#[async_trait]
impl RecordBackend for DynamoDbBackend {
    fn name(&self) -> &'static str {
        "dynamodb"
    }

    async fn get_record(&self) -> Result<Option<ConversationRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(RECORD_KEY_FIELD, AttributeValue::S(RECORD_KEY_VALUE.to_string()))
            .send()
            .await
            .map_err(|e| PersistenceError::Backend(DisplayErrorContext(&e).to_string()))?;

        output.item().map(item_to_record).transpose()
    }

    async fn put_record(&self, record: &ConversationRecord) -> Result<()> {
        self.update_request(record)
            .send()
            .await
            .map_err(|e| PersistenceError::Backend(DisplayErrorContext(&e).to_string()))?;

        debug!(table = %self.table, turns = record.len(), "Conversation item written");
        Ok(())
    }
}

/// The `messages` list attribute of a record.
pub fn messages_attribute(record: &ConversationRecord) -> AttributeValue {
    let turns = record
        .messages
        .iter()
        .map(|turn| {
            AttributeValue::M(HashMap::from([
                (ROLE_ATTR.to_string(), AttributeValue::S(turn.role.as_str().to_string())),
                (CONTENT_ATTR.to_string(), AttributeValue::S(turn.content.clone())),
            ]))
        })
        .collect();
    AttributeValue::L(turns)
}

/// Converts a record into a full DynamoDB item.
pub fn record_to_item(record: &ConversationRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (RECORD_KEY_FIELD.to_string(), AttributeValue::S(record.field.clone())),
        (MESSAGES_ATTR.to_string(), messages_attribute(record)),
    ])
}

/// Converts a DynamoDB item back into a record.
pub fn item_to_record(item: &HashMap<String, AttributeValue>) -> Result<ConversationRecord> {
    let field = item
        .get(RECORD_KEY_FIELD)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .unwrap_or_else(|| RECORD_KEY_VALUE.to_string());

    let messages = match item.get(MESSAGES_ATTR) {
        None => Vec::new(),
        Some(value) => value
            .as_l()
            .map_err(|_| PersistenceError::Malformed("'messages' is not a list".to_string()))?
            .iter()
            .enumerate()
            .map(|(i, v)| attribute_to_turn(i, v))
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(ConversationRecord { field, messages })
}

fn attribute_to_turn(index: usize, value: &AttributeValue) -> Result<Turn> {
    let map = value
        .as_m()
        .map_err(|_| PersistenceError::Malformed(format!("turn {} is not a map", index)))?;

    let role = map
        .get(ROLE_ATTR)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| Role::parse(s))
        .ok_or_else(|| PersistenceError::Malformed(format!("turn {} has no valid role", index)))?;

    let content = map
        .get(CONTENT_ATTR)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| PersistenceError::Malformed(format!("turn {} has no content", index)))?;

    Ok(Turn::new(role, content.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_roundtrip_keeps_order() {
        let record = ConversationRecord::with_turns(vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("third"),
        ]);

        let item = record_to_item(&record);
        assert_eq!(item.get("field").unwrap().as_s().unwrap(), "messages");

        let back = item_to_record(&item).unwrap();
        assert_eq!(back, record);
    }

    fn offline_backend() -> DynamoDbBackend {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .region(aws_sdk_dynamodb::config::Region::new("eu-west-1"))
            .build();
        DynamoDbBackend::new(Client::from_conf(config), "telegpt")
    }

    #[test]
    fn test_write_sets_only_messages_attribute() {
        let backend = offline_backend();
        let record = ConversationRecord::with_turns(vec![Turn::user("hi"), Turn::assistant("hello")]);

        let request = backend.update_request(&record);
        let input = request.as_input();

        assert_eq!(input.get_table_name().as_deref(), Some("telegpt"));
        assert_eq!(input.get_update_expression().as_deref(), Some("SET #messages = :messages"));

        let key = input.get_key().as_ref().unwrap();
        assert_eq!(key.len(), 1);
        assert_eq!(key.get("field").unwrap().as_s().unwrap(), "messages");

        let names = input.get_expression_attribute_names().as_ref().unwrap();
        assert_eq!(names.get("#messages").map(String::as_str), Some("messages"));

        let values = input.get_expression_attribute_values().as_ref().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(":messages"), Some(&messages_attribute(&record)));
    }

    #[test]
    fn test_item_without_messages_is_empty() {
        let item = HashMap::from([("field".to_string(), AttributeValue::S("messages".into()))]);
        assert!(item_to_record(&item).unwrap().is_empty());
    }

    #[test]
    fn test_bad_role_is_malformed() {
        let turn = AttributeValue::M(HashMap::from([
            ("role".to_string(), AttributeValue::S("system".into())),
            ("content".to_string(), AttributeValue::S("x".into())),
        ]));
        let item = HashMap::from([
            ("field".to_string(), AttributeValue::S("messages".into())),
            ("messages".to_string(), AttributeValue::L(vec![turn])),
        ]);

        let err = item_to_record(&item).unwrap_err();
        assert!(matches!(err, PersistenceError::Malformed(_)));
        assert!(err.is_inconsistency());
    }

    #[test]
    fn test_messages_not_a_list() {
        let item = HashMap::from([("messages".to_string(), AttributeValue::S("oops".into()))]);
        assert!(item_to_record(&item).is_err());
    }
}
