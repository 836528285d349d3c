//! Blocking OData v4 client for the platform Web API.
//!
//! Implements `RecordService` over plain HTTP: retrieves with `$select`,
//! runs FetchXML through the query endpoint, creates via POST (id comes
//! back in the `OData-EntityId` header), and patches state transitions.
//! Requests carry the standard OData headers plus an annotations preference
//! so reads include formatted display labels, which the reconciliation
//! logic matches on.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde_json::{json, Map, Value};
use url::Url;
use uuid::Uuid;

use crate::config::WebApiConfig;
use crate::names::{self, entity_sets};
use crate::query::Query;
use crate::record::{AttributeValue, EntityReference, Record};
use crate::service::{RecordService, ServiceError, ServiceResult};
use crate::visibility::StateCounter;

const ODATA_VERSION: &str = "4.0";
const PREFER_ANNOTATIONS: &str = "odata.include-annotations=\"*\"";

/// Suffix the platform appends to annotation keys carrying display labels.
const FORMATTED_SUFFIX: &str = "@OData.Community.Display.V1.FormattedValue";
/// Suffix carrying the logical entity name of a lookup value.
const LOOKUP_SUFFIX: &str = "@Microsoft.Dynamics.CRM.lookuplogicalname";

pub struct WebApiClient {
    http: Client,
    base_url: String,
    api_version: String,
    access_token: String,
}

impl WebApiClient {
    pub fn new(config: &WebApiConfig) -> ServiceResult<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn api_url(&self, path: &str) -> ServiceResult<Url> {
        let raw = format!("{}/api/data/{}/{}", self.base_url, self.api_version, path);
        Ok(Url::parse(&raw)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
            .header("OData-MaxVersion", ODATA_VERSION)
            .header("OData-Version", ODATA_VERSION)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Map non-2xx responses to `ServiceError::Api` with the body text.
    fn check(response: Response) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        Err(ServiceError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl RecordService for WebApiClient {
    fn retrieve(&self, target: &EntityReference, columns: &[&str]) -> ServiceResult<Record> {
        let set = entity_sets::for_entity(&target.logical_name);
        let mut url = self.api_url(&format!("{}({})", set, target.id))?;
        if !columns.is_empty() {
            url.query_pairs_mut()
                .append_pair("$select", &columns.join(","));
        }

        let response = self
            .request(Method::GET, url)
            .header("Prefer", PREFER_ANNOTATIONS)
            .send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(format!(
                "{}({})",
                target.logical_name, target.id
            )));
        }
        let body: Value = Self::check(response)?.json()?;
        Ok(record_from_json(&target.logical_name, &body))
    }

    fn retrieve_multiple(&self, query: &Query) -> ServiceResult<Vec<Record>> {
        let set = entity_sets::for_entity(&query.entity);
        let mut url = self.api_url(&set)?;
        url.query_pairs_mut()
            .append_pair("fetchXml", &query.to_fetch_xml());

        let response = self
            .request(Method::GET, url)
            .header("Prefer", PREFER_ANNOTATIONS)
            .send()?;
        let body: Value = Self::check(response)?.json()?;

        let rows = body
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ServiceError::MalformedResponse("query response has no value array".to_string())
            })?;
        Ok(rows
            .iter()
            .map(|row| record_from_json(&query.entity, row))
            .collect())
    }

    fn create(&self, record: &Record) -> ServiceResult<Uuid> {
        let set = entity_sets::for_entity(&record.logical_name);
        let url = self.api_url(&set)?;
        let body = record_to_json(record);

        let response = self.request(Method::POST, url).json(&body).send()?;
        let response = Self::check(response)?;

        // 204 No Content; the new record's address is in OData-EntityId.
        let header = response
            .headers()
            .get("OData-EntityId")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::MalformedResponse("create response lacks OData-EntityId".to_string())
            })?;
        parse_entity_id(header)
    }

    fn update(&self, record: &Record) -> ServiceResult<()> {
        let id = record
            .id
            .ok_or_else(|| ServiceError::MissingId(record.logical_name.clone()))?;
        let set = entity_sets::for_entity(&record.logical_name);
        let url = self.api_url(&format!("{}({})", set, id))?;
        let body = record_to_json(record);

        let response = self.request(Method::PATCH, url).json(&body).send()?;
        Self::check(response)?;
        Ok(())
    }

    fn set_state(&self, target: &EntityReference, state: i32, status: i32) -> ServiceResult<()> {
        let set = entity_sets::for_entity(&target.logical_name);
        let url = self.api_url(&format!("{}({})", set, target.id))?;
        let body = json!({ "statecode": state, "statuscode": status });

        let response = self.request(Method::PATCH, url).json(&body).send()?;
        Self::check(response)?;
        Ok(())
    }
}

impl StateCounter for WebApiClient {
    /// `GET {states}/$count?$filter=_new_countryid_value eq {id}`; the
    /// response body is the bare count.
    fn count_states_for_country(&self, country_id: Uuid) -> ServiceResult<u64> {
        let mut url = self.api_url(&format!("{}/$count", entity_sets::STATES))?;
        let filter = format!(
            "_{}_value eq {}",
            names::state::COUNTRY_LOOKUP,
            country_id
        );
        url.query_pairs_mut().append_pair("$filter", &filter);

        let response = self.request(Method::GET, url).send()?;
        let body = Self::check(response)?.text()?;
        body.trim()
            .parse::<u64>()
            .map_err(|_| ServiceError::MalformedResponse(format!("not a count: {:?}", body)))
    }
}

/// Extract the uuid out of an `OData-EntityId` header value, e.g.
/// `https://org.example.com/api/data/v9.2/quotes(9f8...)`.
fn parse_entity_id(header: &str) -> ServiceResult<Uuid> {
    let inner = header
        .rsplit_once('(')
        .and_then(|(_, tail)| tail.strip_suffix(')'))
        .ok_or_else(|| {
            ServiceError::MalformedResponse(format!("unparseable OData-EntityId: {}", header))
        })?;
    Uuid::parse_str(inner)
        .map_err(|_| ServiceError::MalformedResponse(format!("bad id in OData-EntityId: {}", inner)))
}

/// Serialize a record for POST/PATCH. References become `@odata.bind`
/// associations; explicit nulls are sent as nulls; absent attributes are
/// not sent at all.
pub fn record_to_json(record: &Record) -> Value {
    let mut map = Map::new();
    for (name, value) in record.attributes() {
        match value {
            AttributeValue::String(s) => {
                map.insert(name.to_string(), Value::String(s.clone()));
            }
            AttributeValue::Integer(n) => {
                map.insert(name.to_string(), json!(n));
            }
            AttributeValue::Decimal(d) => {
                map.insert(name.to_string(), json!(d));
            }
            AttributeValue::Boolean(b) => {
                map.insert(name.to_string(), json!(b));
            }
            AttributeValue::DateTime(ts) => {
                map.insert(name.to_string(), Value::String(ts.to_rfc3339()));
            }
            AttributeValue::Option(v) => {
                map.insert(name.to_string(), json!(v.0));
            }
            AttributeValue::Reference(r) => {
                let set = entity_sets::for_entity(&r.logical_name);
                map.insert(
                    format!("{}@odata.bind", name),
                    Value::String(format!("/{}({})", set, r.id)),
                );
            }
            AttributeValue::Null => {
                map.insert(name.to_string(), Value::Null);
            }
        }
    }
    Value::Object(map)
}

/// Hydrate a record from an OData row. Lookup columns arrive as
/// `_{name}_value` with the target entity in an annotation; display labels
/// arrive as `FormattedValue` annotations and land in the record's
/// formatted-value table.
pub fn record_from_json(logical_name: &str, body: &Value) -> Record {
    let mut record = Record::new(logical_name);
    let Some(object) = body.as_object() else {
        return record;
    };
    let primary_key = format!("{}id", logical_name);

    for (key, value) in object {
        if let Some(base) = key.strip_suffix(FORMATTED_SUFFIX) {
            if let Some(label) = value.as_str() {
                record.set_formatted(normalize_attribute(base), label);
            }
            continue;
        }
        if key.contains('@') {
            // Other annotations (etag, context, lookup logical names) are
            // consumed where needed, not stored as attributes.
            continue;
        }

        if let Some(attr) = lookup_attribute(key) {
            if let Some(id) = value.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                let annotation = format!("{}{}", key, LOOKUP_SUFFIX);
                let target = object
                    .get(&annotation)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                record.set(
                    attr,
                    AttributeValue::Reference(EntityReference::new(target, id)),
                );
            } else if value.is_null() {
                record.set(attr, AttributeValue::Null);
            }
            continue;
        }

        if key == &primary_key {
            if let Some(id) = value.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                record.id = Some(id);
            }
            continue;
        }

        match value {
            Value::Null => record.set(key.clone(), AttributeValue::Null),
            Value::Bool(b) => record.set(key.clone(), AttributeValue::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    record.set(key.clone(), AttributeValue::Integer(i));
                } else {
                    record.set(
                        key.clone(),
                        AttributeValue::Decimal(n.as_f64().unwrap_or(f64::NAN)),
                    );
                }
            }
            Value::String(s) => record.set(key.clone(), AttributeValue::String(s.clone())),
            // Nested objects/arrays (expanded navigation) are out of scope.
            _ => {}
        }
    }
    record
}

/// `_createdby_value` -> `createdby`; plain names pass through.
fn normalize_attribute(raw: &str) -> String {
    lookup_attribute(raw).unwrap_or_else(|| raw.to_string())
}

fn lookup_attribute(key: &str) -> Option<String> {
    key.strip_prefix('_')
        .and_then(|k| k.strip_suffix("_value"))
        .map(|k| k.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{entities, lead, quote};
    use crate::record::OptionValue;

    #[test]
    fn references_serialize_as_odata_bind() {
        let account_id = Uuid::new_v4();
        let mut record = Record::new(entities::QUOTE);
        record.set(
            quote::CUSTOMER,
            AttributeValue::Reference(EntityReference::new(entities::ACCOUNT, account_id)),
        );
        record.set(quote::NAME, AttributeValue::String("Acme Deal".to_string()));
        record.set(quote::REGION_ROLE, AttributeValue::Option(OptionValue(2)));

        let body = record_to_json(&record);
        assert_eq!(
            body["customerid@odata.bind"],
            Value::String(format!("/accounts({})", account_id))
        );
        assert_eq!(body["name"], Value::String("Acme Deal".to_string()));
        assert_eq!(body["new_regionrole"], json!(2));
        assert!(body.get("customerid").is_none());
    }

    #[test]
    fn currency_reference_binds_to_its_collection() {
        // The mapper copies the account's currency onto every quote, so the
        // bind path must use the real collection name, not a naive plural.
        let currency_id = Uuid::new_v4();
        let mut record = Record::new(entities::QUOTE);
        record.set(
            quote::CURRENCY,
            AttributeValue::Reference(EntityReference::new("transactioncurrency", currency_id)),
        );

        let body = record_to_json(&record);
        assert_eq!(
            body["transactioncurrencyid@odata.bind"],
            Value::String(format!("/transactioncurrencies({})", currency_id))
        );
    }

    #[test]
    fn explicit_null_is_sent_absent_is_not() {
        let mut record = Record::new(entities::LEAD);
        record.set(lead::TELEPHONE, AttributeValue::Null);

        let body = record_to_json(&record);
        assert_eq!(body["telephone1"], Value::Null);
        assert!(body.get("subject").is_none());
    }

    #[test]
    fn lookups_and_labels_hydrate_from_annotations() {
        let lead_id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let body = json!({
            "@odata.etag": "W/\"12345\"",
            "leadid": lead_id.to_string(),
            "subject": "Acme Deal",
            "new_regionrole": 100_000_002,
            "new_regionrole@OData.Community.Display.V1.FormattedValue": "Distributor",
            "_parentaccountid_value": account_id.to_string(),
            "_parentaccountid_value@Microsoft.Dynamics.CRM.lookuplogicalname": "account",
            "_parentaccountid_value@OData.Community.Display.V1.FormattedValue": "Acme Corp",
        });

        let record = record_from_json(entities::LEAD, &body);
        assert_eq!(record.id, Some(lead_id));
        assert_eq!(record.get_string(lead::SUBJECT), Some("Acme Deal"));
        assert_eq!(
            record.get_option(lead::REGION_ROLE),
            Some(OptionValue(100_000_002))
        );
        assert_eq!(record.formatted(lead::REGION_ROLE), Some("Distributor"));
        assert_eq!(
            record.get_reference(lead::PARENT_ACCOUNT),
            Some(EntityReference::new(entities::ACCOUNT, account_id))
        );
        assert_eq!(record.formatted(lead::PARENT_ACCOUNT), Some("Acme Corp"));
        assert!(!record.contains("@odata.etag"));
    }

    #[test]
    fn null_lookup_stays_explicitly_null() {
        let body = json!({ "_parentaccountid_value": null });
        let record = record_from_json(entities::LEAD, &body);
        assert_eq!(record.get(lead::PARENT_ACCOUNT), Some(&AttributeValue::Null));
        assert_eq!(record.get_reference(lead::PARENT_ACCOUNT), None);
    }

    #[test]
    fn entity_id_header_parses() {
        let id = Uuid::new_v4();
        let header = format!("https://org.example.com/api/data/v9.2/quotes({})", id);
        assert_eq!(parse_entity_id(&header).unwrap(), id);
        assert!(parse_entity_id("garbage").is_err());
    }
}
