//! Platform name constants for the MCA solution.
//!
//! Logical names, entity-set names, message names, and the fixed column
//! sets used by the qualification plugins. These mirror platform metadata;
//! regenerate from the solution export rather than hand-editing when the
//! customizations change.

/// Entity logical names.
pub mod entities {
    pub const LEAD: &str = "lead";
    pub const ACCOUNT: &str = "account";
    pub const QUOTE: &str = "quote";
    /// Option-set metadata table: (entity, attribute, code) -> display label.
    pub const STRINGMAP: &str = "stringmap";
    pub const COUNTRY: &str = "new_country";
    pub const STATE: &str = "new_state";
}

/// Entity-set (collection) names for the Web API.
pub mod entity_sets {
    pub const LEADS: &str = "leads";
    pub const ACCOUNTS: &str = "accounts";
    pub const QUOTES: &str = "quotes";
    pub const STRINGMAPS: &str = "stringmaps";
    pub const COUNTRIES: &str = "new_countries";
    pub const STATES: &str = "new_states";
    // Standard entities the qualification mapper references on the quote.
    pub const SYSTEM_USERS: &str = "systemusers";
    pub const PRICE_LEVELS: &str = "pricelevels";
    pub const CURRENCIES: &str = "transactioncurrencies";

    /// Resolve a logical name to its Web API collection name. Falls back to
    /// OData-convention pluralization for entities outside the solution's
    /// metadata (trailing `y` becomes `ies`).
    pub fn for_entity(logical_name: &str) -> String {
        match logical_name {
            super::entities::LEAD => LEADS.to_string(),
            super::entities::ACCOUNT => ACCOUNTS.to_string(),
            super::entities::QUOTE => QUOTES.to_string(),
            super::entities::STRINGMAP => STRINGMAPS.to_string(),
            super::entities::COUNTRY => COUNTRIES.to_string(),
            super::entities::STATE => STATES.to_string(),
            "systemuser" => SYSTEM_USERS.to_string(),
            "pricelevel" => PRICE_LEVELS.to_string(),
            "transactioncurrency" => CURRENCIES.to_string(),
            other => match other.strip_suffix('y') {
                Some(stem) => format!("{}ies", stem),
                None => format!("{}s", other),
            },
        }
    }
}

/// Pipeline message names.
pub mod messages {
    pub const CREATE: &str = "Create";
    pub const UPDATE: &str = "Update";
    pub const DELETE: &str = "Delete";
    /// Custom action driving lead qualification.
    pub const QUALIFY_LEAD_TO_QUOTE: &str = "mca_QualifyLeadToQuoteAction";
}

/// Parameter names on the qualify action's request/response.
pub mod parameters {
    pub const TARGET: &str = "Target";
    pub const SUCCESS: &str = "Success";
    pub const RESULT_MESSAGE: &str = "ResultMessage";
    pub const EXECUTION_RESULT: &str = "ExecutionResult";
}

/// Lead attributes read by the qualification mapper.
pub mod lead {
    pub const SUBJECT: &str = "subject";
    pub const BUSINESS_STREAM: &str = "new_businessstream";
    pub const VERTICAL_MARKET_APPLICATION: &str = "new_verticalmarketapplication";
    pub const COUNTRY: &str = "new_country";
    pub const PRODUCT_CATEGORY: &str = "new_productcategory";
    pub const REGION_ROLE: &str = "new_regionrole";
    pub const FIRST_NAME: &str = "firstname";
    pub const LAST_NAME: &str = "lastname";
    pub const TELEPHONE: &str = "telephone1";
    pub const CREATED_BY: &str = "createdby";
    pub const PARENT_ACCOUNT: &str = "parentaccountid";

    /// Column projection for the mapper's lead retrieve.
    pub const COLUMNS: &[&str] = &[
        SUBJECT,
        BUSINESS_STREAM,
        VERTICAL_MARKET_APPLICATION,
        COUNTRY,
        PRODUCT_CATEGORY,
        REGION_ROLE,
        FIRST_NAME,
        LAST_NAME,
        TELEPHONE,
        CREATED_BY,
        PARENT_ACCOUNT,
    ];

    /// Closed/qualified state codes (platform global option set, not
    /// configurable).
    pub const STATE_QUALIFIED: i32 = 1;
    pub const STATUS_QUALIFIED: i32 = 3;
}

/// Account attributes read by the qualification mapper.
pub mod account {
    pub const PRICE_LEVEL: &str = "defaultpricelevelid";
    pub const CURRENCY: &str = "transactioncurrencyid";
    pub const ACCOUNT_CATEGORY: &str = "new_accountcategory";
    pub const SUPPLY_AGREEMENT_CATEGORY: &str = "new_supplyagreementcategory";
    pub const PAYMENT_TERMS: &str = "new_paymentterms";

    pub const COLUMNS: &[&str] = &[
        PRICE_LEVEL,
        CURRENCY,
        ACCOUNT_CATEGORY,
        SUPPLY_AGREEMENT_CATEGORY,
        PAYMENT_TERMS,
    ];
}

/// Quote attributes written by the qualification mapper.
pub mod quote {
    pub const QUOTE_ID: &str = "quoteid";
    pub const NAME: &str = "name";
    pub const BUSINESS_STREAM: &str = "new_businessstream";
    pub const VERTICAL_MARKET_APPLICATION: &str = "new_verticalmarketapplication";
    pub const COUNTRY: &str = "new_country";
    pub const PRODUCT_CATEGORY: &str = "new_productcategory";
    pub const REGION_ROLE: &str = "new_regionrole";
    pub const CONTACT: &str = "new_contact";
    pub const PHONE: &str = "new_phone";
    pub const OWNER: &str = "ownerid";
    pub const ORIGINATING_LEAD: &str = "new_originatinglead";
    pub const CUSTOMER: &str = "customerid";
    pub const PRICE_LEVEL: &str = "pricelevelid";
    pub const CURRENCY: &str = "transactioncurrencyid";
    pub const PAYMENT_TERMS: &str = "new_paymentterms";
    pub const ACCOUNT_CATEGORY: &str = "new_accountcategory";
    pub const SUPPLY_AGREEMENT_CATEGORY: &str = "new_supplyagreementcategory";
    pub const CREATED_ON: &str = "createdon";
}

/// Stringmap (option-set metadata) attributes.
pub mod stringmap {
    /// Logical name of the entity the option set belongs to.
    pub const OBJECT_TYPE_CODE_NAME: &str = "objecttypecodename";
    pub const ATTRIBUTE_NAME: &str = "attributename";
    /// Display label.
    pub const VALUE: &str = "value";
    /// Raw integer code.
    pub const ATTRIBUTE_VALUE: &str = "attributevalue";
}

/// State entity attributes used by the visibility resolver.
pub mod state {
    pub const COUNTRY_LOOKUP: &str = "new_countryid";
}
