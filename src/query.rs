//! Structured queries rendered to the platform's FetchXML dialect.
//!
//! Only the slice of the language the plugins use: column projection,
//! and-combined equality filters, sort order, and a row cap.

use quick_xml::escape::escape;

use crate::record::AttributeValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    Null,
    NotNull,
}

impl ConditionOperator {
    fn as_fetch(&self) -> &'static str {
        match self {
            ConditionOperator::Equal => "eq",
            ConditionOperator::NotEqual => "ne",
            ConditionOperator::Null => "null",
            ConditionOperator::NotNull => "not-null",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub attribute: String,
    pub operator: ConditionOperator,
    pub value: Option<AttributeValue>,
}

impl Condition {
    pub fn equal(attribute: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            attribute: attribute.into(),
            operator: ConditionOperator::Equal,
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub attribute: String,
    pub direction: SortDirection,
}

/// A query against one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub entity: String,
    pub columns: Vec<String>,
    pub conditions: Vec<Condition>,
    pub orders: Vec<Order>,
    pub top: Option<u32>,
}

impl Query {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
            orders: Vec::new(),
            top: None,
        }
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, attribute: impl Into<String>, direction: SortDirection) -> Self {
        self.orders.push(Order {
            attribute: attribute.into(),
            direction,
        });
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Render to FetchXML for the data service's query endpoint.
    pub fn to_fetch_xml(&self) -> String {
        let mut xml = String::from("<fetch");
        if let Some(top) = self.top {
            xml.push_str(&format!(" top=\"{}\"", top));
        }
        xml.push('>');
        xml.push_str(&format!("<entity name=\"{}\">", escape(&self.entity)));
        for column in &self.columns {
            xml.push_str(&format!("<attribute name=\"{}\"/>", escape(column)));
        }
        for order in &self.orders {
            let descending = matches!(order.direction, SortDirection::Descending);
            xml.push_str(&format!(
                "<order attribute=\"{}\" descending=\"{}\"/>",
                escape(&order.attribute),
                descending
            ));
        }
        if !self.conditions.is_empty() {
            xml.push_str("<filter type=\"and\">");
            for condition in &self.conditions {
                xml.push_str(&format!(
                    "<condition attribute=\"{}\" operator=\"{}\"",
                    escape(&condition.attribute),
                    condition.operator.as_fetch()
                ));
                if let Some(value) = &condition.value {
                    xml.push_str(&format!(" value=\"{}\"", escape(&fetch_value(value))));
                }
                xml.push_str("/>");
            }
            xml.push_str("</filter>");
        }
        xml.push_str("</entity></fetch>");
        xml
    }
}

/// Scalar rendering of a condition value. References compare by id.
fn fetch_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s) => s.clone(),
        AttributeValue::Integer(n) => n.to_string(),
        AttributeValue::Decimal(d) => d.to_string(),
        AttributeValue::Boolean(b) => b.to_string(),
        AttributeValue::DateTime(ts) => ts.to_rfc3339(),
        AttributeValue::Reference(r) => r.id.to_string(),
        AttributeValue::Option(v) => v.0.to_string(),
        AttributeValue::Null => String::new(),
    }
}
