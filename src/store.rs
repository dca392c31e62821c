use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Failures below the service layer. Anything here surfaces to clients as a
/// generic server error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("record is not a JSON object")]
    NotAnObject,
}

/// A record read back from a collection: store-assigned id, stamps, and the
/// JSON body the caller originally supplied.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    body: Map<String, Value>,
}

impl Document {
    /// Deserialize the body into a typed record.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.body.clone()))?)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.body.get(name).and_then(Value::as_str)
    }

    /// Wire representation: body fields plus `_id` and the stamps. Identifiers
    /// always cross the boundary as plain strings.
    pub fn into_json(mut self) -> Value {
        self.body.insert("_id".to_string(), Value::String(self.id));
        self.body.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        self.body.insert(
            "updated_at".to_string(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        Value::Object(self.body)
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document, StoreError> {
        let body = match serde_json::from_str(&self.body)? {
            Value::Object(map) => map,
            _ => return Err(StoreError::NotAnObject),
        };
        Ok(Document {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            body,
        })
    }
}

/// Typed SQL-bindable value, matched when binding filter clauses.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Date(NaiveDate),
}

impl FilterValue {
    fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(v) => Value::String(v.clone()),
            FilterValue::Int(v) => Value::from(*v),
            FilterValue::Date(v) => Value::String(v.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Eq,
    Gte,
    Lt,
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gte => ">=",
            Op::Lt => "<",
        }
    }
}

#[derive(Debug, Clone)]
struct Clause {
    field: String,
    op: Op,
    value: FilterValue,
}

/// Filter over body fields, compiled to `json_extract` conditions. Field names
/// come from code, never from request input.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.clauses.push(Clause {
            field: field.to_owned(),
            op: Op::Eq,
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.clauses.push(Clause {
            field: field.to_owned(),
            op: Op::Gte,
            value: value.into(),
        });
        self
    }

    pub fn lt(mut self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.clauses.push(Clause {
            field: field.to_owned(),
            op: Op::Lt,
            value: value.into(),
        });
        self
    }

    fn where_sql(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!(" AND json_extract(body, '$.{}') {} ?", c.field, c.op.symbol()))
            .collect()
    }

    /// Equality clauses as a field map, seeded into the record an upsert miss
    /// creates.
    fn eq_fields(&self) -> Map<String, Value> {
        self.clauses
            .iter()
            .filter(|c| matches!(c.op, Op::Eq))
            .map(|c| (c.field.clone(), c.value.to_json()))
            .collect()
    }
}

/// Serialize a record into the field map the store persists.
pub fn to_object<T: Serialize>(record: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Generic create/read/update/delete over named collections. One `documents`
/// table holds every record as a JSON body addressed by a store-assigned id.
#[derive(Clone)]
pub struct DocStore {
    pool: SqlitePool,
}

impl DocStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a record, assigning its identifier and stamping both timestamps.
    pub async fn insert<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<String, StoreError> {
        let body = to_object(record)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO documents (id, collection, body, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(collection)
        .bind(Value::Object(body).to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            "SELECT id, body, created_at, updated_at FROM documents \
             WHERE collection = ?{} ORDER BY created_at, id",
            filter.where_sql()
        );
        let mut query = sqlx::query_as::<_, DocumentRow>(&sql).bind(collection);
        for clause in &filter.clauses {
            query = match &clause.value {
                FilterValue::Text(v) => query.bind(v.clone()),
                FilterValue::Int(v) => query.bind(*v),
                FilterValue::Date(v) => query.bind(*v),
            };
        }
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(DocumentRow::into_document)
            .collect()
    }

    pub async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let sql = format!(
            "SELECT id, body, created_at, updated_at FROM documents \
             WHERE collection = ?{} ORDER BY created_at, id LIMIT 1",
            filter.where_sql()
        );
        let mut query = sqlx::query_as::<_, DocumentRow>(&sql).bind(collection);
        for clause in &filter.clauses {
            query = match &clause.value {
                FilterValue::Text(v) => query.bind(v.clone()),
                FilterValue::Int(v) => query.bind(*v),
                FilterValue::Date(v) => query.bind(*v),
            };
        }
        query
            .fetch_optional(&self.pool)
            .await?
            .map(DocumentRow::into_document)
            .transpose()
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, body, created_at, updated_at FROM documents \
             WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(DocumentRow::into_document)
        .transpose()
    }

    /// Merge `fields` into the first record matching `filter`, top level only;
    /// fields absent from the patch keep their stored values. On a miss with
    /// `upsert`, a new record is created from the filter's equality fields
    /// plus the patch. Returns the number of records matched.
    pub async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: &Map<String, Value>,
        upsert: bool,
    ) -> Result<u64, StoreError> {
        if let Some(doc) = self.find_one(collection, filter).await? {
            self.write_merged(&doc, fields).await?;
            return Ok(1);
        }
        if upsert {
            let mut body = filter.eq_fields();
            for (key, value) in fields {
                body.insert(key.clone(), value.clone());
            }
            self.insert(collection, &Value::Object(body)).await?;
            return Ok(1);
        }
        Ok(0)
    }

    /// Merge `fields` into the identified record. A missing id is a no-op,
    /// reported through the matched count.
    pub async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<u64, StoreError> {
        match self.get(collection, id).await? {
            Some(doc) => {
                self.write_merged(&doc, fields).await?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn write_merged(
        &self,
        doc: &Document,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut body = doc.body.clone();
        for (key, value) in fields {
            body.insert(key.clone(), value.clone());
        }
        sqlx::query("UPDATE documents SET body = ?, updated_at = ? WHERE id = ?")
            .bind(Value::Object(body).to_string())
            .bind(Utc::now())
            .bind(&doc.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        let sql = format!(
            "DELETE FROM documents WHERE collection = ?{}",
            filter.where_sql()
        );
        let mut query = sqlx::query(&sql).bind(collection);
        for clause in &filter.clauses {
            query = match &clause.value {
                FilterValue::Text(v) => query.bind(v.clone()),
                FilterValue::Int(v) => query.bind(*v),
                FilterValue::Date(v) => query.bind(*v),
            };
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Names of collections that currently hold at least one record.
    pub async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(
            sqlx::query_scalar::<_, String>(
                "SELECT DISTINCT collection FROM documents ORDER BY collection",
            )
            .fetch_all(&self.pool)
            .await?,
        )
    }
}
