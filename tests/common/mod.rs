//! In-memory `RecordService` double for plugin-level tests.
//!
//! Stores records in insertion order (queries must return stringmap rows in
//! a pinned order because reconciliation is order-sensitive), evaluates the
//! filter subset the plugins use, and journals creates and state
//! transitions so tests can assert on side effects.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use mca_crm_plugins::query::{ConditionOperator, Query, SortDirection};
use mca_crm_plugins::{AttributeValue, EntityReference, Record, RecordService, ServiceError, ServiceResult};

pub struct MemoryService {
    records: RefCell<Vec<Record>>,
    pub created: RefCell<Vec<EntityReference>>,
    pub state_transitions: RefCell<Vec<(EntityReference, i32, i32)>>,
    /// When set, `create` fails like a 500 from the data service.
    pub fail_create: Cell<bool>,
    clock: Cell<i64>,
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryService {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
            state_transitions: RefCell::new(Vec::new()),
            fail_create: Cell::new(false),
            clock: Cell::new(0),
        }
    }

    /// Seed a pre-existing record. Assigns an id when the record has none.
    pub fn insert(&self, mut record: Record) -> EntityReference {
        if record.id.is_none() {
            record.id = Some(Uuid::new_v4());
        }
        let reference = record.reference().expect("seeded record has an id");
        self.records.borrow_mut().push(record);
        reference
    }

    /// Seed stringmap rows for one (entity, attribute) option set, in the
    /// order the service should return them.
    pub fn seed_stringmap(&self, entity: &str, attribute: &str, options: &[(&str, i32)]) {
        use mca_crm_plugins::names::{entities, stringmap};
        for (label, value) in options {
            let mut row = Record::new(entities::STRINGMAP);
            row.set(
                stringmap::OBJECT_TYPE_CODE_NAME,
                AttributeValue::String(entity.to_string()),
            );
            row.set(
                stringmap::ATTRIBUTE_NAME,
                AttributeValue::String(attribute.to_string()),
            );
            row.set(stringmap::VALUE, AttributeValue::String(label.to_string()));
            row.set(stringmap::ATTRIBUTE_VALUE, AttributeValue::Integer(*value as i64));
            self.insert(row);
        }
    }

    /// Replace a stored record wholesale (tests use this to attach the
    /// formatted labels a real read would have carried).
    pub fn replace(&self, record: Record) {
        let mut records = self.records.borrow_mut();
        if let Some(stored) = records
            .iter_mut()
            .find(|r| r.id == record.id && r.logical_name == record.logical_name)
        {
            *stored = record;
        }
    }

    pub fn records_of(&self, logical_name: &str) -> Vec<Record> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.logical_name == logical_name)
            .cloned()
            .collect()
    }

    fn project(record: &Record, columns: &[String]) -> Record {
        if columns.is_empty() {
            return record.clone();
        }
        let mut projected = Record::new(record.logical_name.clone());
        projected.id = record.id;
        for column in columns {
            if let Some(value) = record.get(column) {
                projected.set(column.clone(), value.clone());
            }
            if let Some(label) = record.formatted(column) {
                projected.set_formatted(column.clone(), label);
            }
        }
        projected
    }
}

/// Equality across the representations a stored value may take (option
/// codes read back as integers, references compared by target).
fn value_eq(stored: &AttributeValue, expected: &AttributeValue) -> bool {
    match (stored, expected) {
        (AttributeValue::Integer(a), AttributeValue::Option(b)) => *a == b.0 as i64,
        (AttributeValue::Option(a), AttributeValue::Integer(b)) => a.0 as i64 == *b,
        (AttributeValue::Reference(a), AttributeValue::Reference(b)) => a.id == b.id,
        (a, b) => a == b,
    }
}

fn compare_for_sort(a: Option<&AttributeValue>, b: Option<&AttributeValue>) -> Ordering {
    match (a, b) {
        (Some(AttributeValue::DateTime(x)), Some(AttributeValue::DateTime(y))) => x.cmp(y),
        (Some(AttributeValue::Integer(x)), Some(AttributeValue::Integer(y))) => x.cmp(y),
        (Some(AttributeValue::String(x)), Some(AttributeValue::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

impl RecordService for MemoryService {
    fn retrieve(&self, target: &EntityReference, columns: &[&str]) -> ServiceResult<Record> {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        self.records
            .borrow()
            .iter()
            .find(|r| r.id == Some(target.id) && r.logical_name == target.logical_name)
            .map(|r| Self::project(r, &columns))
            .ok_or_else(|| {
                ServiceError::NotFound(format!("{}({})", target.logical_name, target.id))
            })
    }

    fn retrieve_multiple(&self, query: &Query) -> ServiceResult<Vec<Record>> {
        let mut rows: Vec<Record> = self
            .records
            .borrow()
            .iter()
            .filter(|r| r.logical_name == query.entity)
            .filter(|r| {
                query.conditions.iter().all(|c| match c.operator {
                    ConditionOperator::Equal => c
                        .value
                        .as_ref()
                        .and_then(|expected| r.get(&c.attribute).map(|v| value_eq(v, expected)))
                        .unwrap_or(false),
                    ConditionOperator::NotEqual => c
                        .value
                        .as_ref()
                        .and_then(|expected| r.get(&c.attribute).map(|v| !value_eq(v, expected)))
                        .unwrap_or(false),
                    ConditionOperator::Null => r.value(&c.attribute).is_none(),
                    ConditionOperator::NotNull => r.value(&c.attribute).is_some(),
                })
            })
            .cloned()
            .collect();

        for order in query.orders.iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare_for_sort(a.get(&order.attribute), b.get(&order.attribute));
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(top) = query.top {
            rows.truncate(top as usize);
        }
        Ok(rows.iter().map(|r| Self::project(r, &query.columns)).collect())
    }

    fn create(&self, record: &Record) -> ServiceResult<Uuid> {
        if self.fail_create.get() {
            return Err(ServiceError::Api {
                status: 500,
                message: "create rejected".to_string(),
            });
        }
        let mut stored = record.clone();
        let id = Uuid::new_v4();
        stored.id = Some(id);

        // Monotonic createdon so "newest first" queries are deterministic.
        let tick = self.clock.get();
        self.clock.set(tick + 1);
        let created_on = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .unwrap()
            + Duration::seconds(tick);
        stored.set("createdon", AttributeValue::DateTime(created_on));

        self.created
            .borrow_mut()
            .push(EntityReference::new(stored.logical_name.clone(), id));
        self.records.borrow_mut().push(stored);
        Ok(id)
    }

    fn update(&self, record: &Record) -> ServiceResult<()> {
        let id = record
            .id
            .ok_or_else(|| ServiceError::MissingId(record.logical_name.clone()))?;
        let mut records = self.records.borrow_mut();
        let stored = records
            .iter_mut()
            .find(|r| r.id == Some(id) && r.logical_name == record.logical_name)
            .ok_or_else(|| ServiceError::NotFound(format!("{}({})", record.logical_name, id)))?;
        for (name, value) in record.attributes() {
            stored.set(name.to_string(), value.clone());
        }
        Ok(())
    }

    fn set_state(&self, target: &EntityReference, state: i32, status: i32) -> ServiceResult<()> {
        self.state_transitions
            .borrow_mut()
            .push((target.clone(), state, status));
        Ok(())
    }
}
