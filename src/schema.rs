//! Structural validation of raw backend replies.
//!
//! The bridge hands us untyped JSON. The reply contract is derived from the
//! wire types with `schemars` and compiled once into a `jsonschema` validator.
//! [`validate`] collects every violation with the path to the offending field,
//! maps it onto [`IssueCode`], and only deserializes an [`Envelope`] when the
//! whole reply is clean.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use once_cell::sync::Lazy;
use schemars::gen::{SchemaGenerator, SchemaSettings};
use schemars::schema::{
    ArrayValidation, InstanceType, NumberValidation, ObjectValidation, Schema, SchemaObject,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::discriminator::PayloadKind;
use crate::envelope::{Envelope, ResponseData, WindowActionResult};
use crate::model::Instance;

/// A closed set of string values, as written on the wire.
pub trait WireEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [&'static str];

    fn from_wire(value: &str) -> Option<Self>;

    fn as_wire(self) -> &'static str;
}

// ============================================================================
// Issues
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    /// Integers are reported as `Number`; `Integer` only appears as an expectation.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::String,
            "array" => Self::Array,
            "object" => Self::Object,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a field inside a reply, rendered as `data.InstancesVec[0].loader`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves a JSON pointer against the reply it was reported for, so a
    /// numeric token becomes an index only where the reply holds an array.
    fn locate(root: &Value, pointer: &str) -> Self {
        let mut segments = Vec::new();
        let mut node = Some(root);
        for token in pointer.split('/').skip(1) {
            let token = token.replace("~1", "/").replace("~0", "~");
            let segment = match (node, token.parse::<usize>()) {
                (Some(Value::Array(_)), Ok(index)) => PathSegment::Index(index),
                _ => PathSegment::Key(token),
            };
            node = node.and_then(|value| match &segment {
                PathSegment::Key(key) => value.get(key.as_str()),
                PathSegment::Index(index) => value.get(*index),
            });
            segments.push(segment);
        }
        Self(segments)
    }

    fn child(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType {
        expected: Vec<JsonType>,
        received: JsonType,
    },
    MissingField,
    InvalidEnumValue {
        received: String,
        allowed: Vec<String>,
    },
    NotAnInteger {
        received: Number,
    },
    NumberOutOfRange {
        received: Number,
        min: i64,
        max: i64,
    },
    NoMatchingVariant {
        allowed: &'static [&'static str],
    },
    AmbiguousVariant {
        tags: Vec<String>,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
    /// Passed the schema but still could not be read into the wire types.
    Undecodable {
        reason: String,
    },
    Other {
        keyword: String,
        message: String,
    },
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidType { expected, received } => {
                let expected: Vec<_> = expected.iter().map(|t| t.as_str()).collect();
                write!(f, "expected {}, received {received}", expected.join(" or "))
            }
            Self::MissingField => f.write_str("required field is missing"),
            Self::InvalidEnumValue { received, allowed } => write!(
                f,
                "invalid value {received:?}, expected one of {}",
                allowed.join(", ")
            ),
            Self::NotAnInteger { received } => write!(f, "expected an integer, received {received}"),
            Self::NumberOutOfRange { received, min, max } => {
                write!(f, "{received} is outside {min}..={max}")
            }
            Self::NoMatchingVariant { allowed } => {
                write!(f, "no known payload tag, expected one of {}", allowed.join(", "))
            }
            Self::AmbiguousVariant { tags } => {
                write!(f, "payload carries several tags: {}", tags.join(", "))
            }
            Self::UnrecognizedKeys { keys } => write!(f, "unrecognized keys: {}", keys.join(", ")),
            Self::Undecodable { reason } => write!(f, "undecodable reply: {reason}"),
            Self::Other { keyword, message } => write!(f, "{keyword}: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIssue {
    pub path: FieldPath,
    #[serde(flatten)]
    pub code: IssueCode,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.code)
    }
}

/// Every issue found in one reply, in the order the validator reported them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaValidationError {
    issues: Vec<SchemaIssue>,
}

impl SchemaValidationError {
    #[must_use]
    pub fn new(issues: Vec<SchemaIssue>) -> Self {
        Self { issues }
    }

    #[must_use]
    pub fn issues(&self) -> &[SchemaIssue] {
        &self.issues
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&SchemaIssue> {
        self.issues.first()
    }

    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.issues.iter().map(|issue| &issue.path)
    }

    /// Matches against the rendered path, e.g. `"data.InstancesVec[0].loader"`.
    #[must_use]
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.paths().any(|p| p.to_string() == path)
    }

    /// The first issue reported at `path`.
    #[must_use]
    pub fn issue_at(&self, path: &str) -> Option<&IssueCode> {
        self.issues
            .iter()
            .find(|issue| issue.path.to_string() == path)
            .map(|issue| &issue.code)
    }

    /// Nests the flat issue list by path.
    #[must_use]
    pub fn tree(&self) -> IssueTree {
        let mut root = IssueTree::default();
        for issue in &self.issues {
            let mut node = &mut root;
            for segment in issue.path.segments() {
                node = match segment {
                    PathSegment::Key(key) => node.properties.entry(key.clone()).or_default(),
                    PathSegment::Index(index) => node.items.entry(*index).or_default(),
                };
            }
            node.errors.push(issue.code.to_string());
        }
        root
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => f.write_str("invalid reply"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for SchemaValidationError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueTree {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, IssueTree>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<usize, IssueTree>,
}

// ============================================================================
// Contract schema
// ============================================================================

/// Exactly one known tag per payload object. Foreign keys are never allowed
/// beside it, so an instance list cannot pass as a name list or vice versa.
impl JsonSchema for ResponseData {
    fn schema_name() -> String {
        "ResponseData".to_owned()
    }

    // Inlined so `Option<ResponseData>` becomes `"type": ["object", "null"]`.
    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let properties = PayloadKind::ALL
            .into_iter()
            .map(|kind| (kind.tag().to_owned(), payload_schema(gen, kind)))
            .collect();

        SchemaObject {
            instance_type: Some(InstanceType::Object.into()),
            object: Some(Box::new(ObjectValidation {
                min_properties: Some(1),
                max_properties: Some(1),
                properties,
                additional_properties: Some(Box::new(Schema::Bool(false))),
                ..ObjectValidation::default()
            })),
            ..SchemaObject::default()
        }
        .into()
    }
}

fn payload_schema(gen: &mut SchemaGenerator, kind: PayloadKind) -> Schema {
    match kind {
        PayloadKind::MinecraftVersions | PayloadKind::Settings | PayloadKind::InstanceNames => {
            gen.subschema_for::<Vec<String>>()
        }
        PayloadKind::WindowAction => gen.subschema_for::<WindowActionResult>(),
        PayloadKind::InstanceData => byte_list_schema(),
        PayloadKind::InstancesVec => gen.subschema_for::<Vec<Instance>>(),
    }
}

// schemars leaves `u8` unbounded above.
fn byte_list_schema() -> Schema {
    let byte = SchemaObject {
        instance_type: Some(InstanceType::Integer.into()),
        number: Some(Box::new(NumberValidation {
            minimum: Some(f64::from(u8::MIN)),
            maximum: Some(f64::from(u8::MAX)),
            ..NumberValidation::default()
        })),
        ..SchemaObject::default()
    };

    SchemaObject {
        instance_type: Some(InstanceType::Array.into()),
        array: Some(Box::new(ArrayValidation {
            items: Some(Schema::from(byte).into()),
            ..ArrayValidation::default()
        })),
        ..SchemaObject::default()
    }
    .into()
}

/// The JSON schema every backend reply must satisfy.
///
/// # Panics
///
/// Panics if the generated schema cannot be serialized; this indicates a programming error.
#[must_use]
pub fn envelope_schema_json() -> Value {
    let mut root = SchemaSettings::draft07()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<Envelope>();
    // serde would read a missing `error`/`data` as `None`; the wire requires both keys.
    root.schema
        .object()
        .required
        .extend(["error".to_owned(), "data".to_owned()]);
    serde_json::to_value(&root).expect("envelope schema json")
}

struct EnvelopeSchema {
    document: Value,
    validator: Validator,
}

static ENVELOPE_SCHEMA: Lazy<EnvelopeSchema> = Lazy::new(|| {
    let document = envelope_schema_json();
    let validator = jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&document)
        .expect("envelope schema to compile");
    EnvelopeSchema {
        document,
        validator,
    }
});

// ============================================================================
// Validation
// ============================================================================

/// Checks one raw reply against the envelope contract.
pub fn validate(raw: &Value) -> Result<Envelope, SchemaValidationError> {
    let issues = collect_issues(raw);
    if !issues.is_empty() {
        return Err(SchemaValidationError::new(issues));
    }

    Envelope::deserialize(raw).map_err(|e| {
        SchemaValidationError::new(vec![SchemaIssue {
            path: FieldPath::default(),
            code: IssueCode::Undecodable {
                reason: e.to_string(),
            },
        }])
    })
}

fn collect_issues(raw: &Value) -> Vec<SchemaIssue> {
    let schema = &*ENVELOPE_SCHEMA;
    let mut issues = Vec::new();
    // minProperties, maxProperties and additionalProperties all fire on the
    // same payload object; it gets one issue.
    let mut payload_objects: Vec<FieldPath> = Vec::new();

    for error in schema.validator.iter_errors(raw) {
        let path = FieldPath::locate(raw, error.instance_path.as_str());
        let rule = schema.document.pointer(error.schema_path.as_str());

        let (path, code) = match &error.kind {
            ValidationErrorKind::Required { property } => {
                let name = property
                    .as_str()
                    .map_or_else(|| property.to_string(), str::to_owned);
                (path.child(name), IssueCode::MissingField)
            }
            ValidationErrorKind::Type { .. } => (path, type_issue(rule, &error.instance)),
            ValidationErrorKind::Enum { .. } => (
                path,
                IssueCode::InvalidEnumValue {
                    received: value_text(&error.instance),
                    allowed: allowed_values(rule),
                },
            ),
            ValidationErrorKind::Minimum { .. } | ValidationErrorKind::Maximum { .. } => {
                (path, range_issue(&error.instance))
            }
            ValidationErrorKind::MinProperties { .. }
            | ValidationErrorKind::MaxProperties { .. }
            | ValidationErrorKind::AdditionalProperties { .. } => {
                if payload_objects.contains(&path) {
                    continue;
                }
                payload_objects.push(path.clone());
                (path, payload_key_issue(&error.instance))
            }
            _ => {
                let keyword = error
                    .schema_path
                    .as_str()
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_owned();
                (
                    path,
                    IssueCode::Other {
                        keyword,
                        message: error.to_string(),
                    },
                )
            }
        };
        issues.push(SchemaIssue { path, code });
    }

    issues
}

fn type_issue(rule: Option<&Value>, instance: &Value) -> IssueCode {
    let expected: Vec<JsonType> = match rule {
        Some(Value::String(keyword)) => JsonType::from_keyword(keyword).into_iter().collect(),
        Some(Value::Array(keywords)) => keywords
            .iter()
            .filter_map(Value::as_str)
            .filter_map(JsonType::from_keyword)
            .collect(),
        _ => Vec::new(),
    };

    match instance {
        Value::Number(number) if expected == [JsonType::Integer] => IssueCode::NotAnInteger {
            received: number.clone(),
        },
        other => IssueCode::InvalidType {
            expected,
            received: JsonType::of(other),
        },
    }
}

// Bytes are the only bounded numbers on the wire.
fn range_issue(instance: &Value) -> IssueCode {
    match instance {
        Value::Number(number) => IssueCode::NumberOutOfRange {
            received: number.clone(),
            min: i64::from(u8::MIN),
            max: i64::from(u8::MAX),
        },
        other => IssueCode::InvalidType {
            expected: vec![JsonType::Integer],
            received: JsonType::of(other),
        },
    }
}

fn payload_key_issue(instance: &Value) -> IssueCode {
    let Value::Object(object) = instance else {
        return IssueCode::InvalidType {
            expected: vec![JsonType::Object],
            received: JsonType::of(instance),
        };
    };

    let (tags, foreign): (Vec<&String>, Vec<&String>) = object
        .keys()
        .partition(|key| PayloadKind::from_tag(key).is_some());

    match tags.len() {
        0 => IssueCode::NoMatchingVariant {
            allowed: PayloadKind::TAGS,
        },
        1 => IssueCode::UnrecognizedKeys {
            keys: foreign.into_iter().cloned().collect(),
        },
        _ => IssueCode::AmbiguousVariant {
            tags: tags.into_iter().cloned().collect(),
        },
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn allowed_values(rule: Option<&Value>) -> Vec<String> {
    rule.and_then(Value::as_array)
        .map(|values| values.iter().map(value_text).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{BackendErrorKind, ClientError};
    use crate::model::Loader;
    use serde_json::json;

    fn instance_json(name: &str) -> Value {
        json!({
            "name": name,
            "loader": "Fabric",
            "version": "1.20.4",
            "custom_args": ["-Xmx4G"],
            "downloaded": true
        })
    }

    fn sorted_issues(err: &SchemaValidationError) -> Vec<(String, IssueCode)> {
        let mut issues: Vec<_> = err
            .issues()
            .iter()
            .map(|issue| (issue.path.to_string(), issue.code.clone()))
            .collect();
        issues.sort_by(|a, b| a.0.cmp(&b.0));
        issues
    }

    #[test]
    fn schema_requires_all_three_keys() {
        let schema = envelope_schema_json();
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        for key in ["success", "error", "data"] {
            assert!(required.contains(&key), "{key} not required");
        }
        assert_eq!(
            schema["properties"]["data"]["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn accepts_instance_list() {
        let raw = json!({
            "success": true,
            "error": null,
            "data": { "InstancesVec": [instance_json("Modpack")] }
        });
        let envelope = validate(&raw).unwrap();
        let instances = envelope.data.unwrap().into_instances_vec().unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].loader, Loader::Fabric);
        assert!(instances[0].downloaded);
    }

    #[test]
    fn accepts_failure_with_null_message() {
        let raw = json!({
            "success": false,
            "error": { "error_type": "FileError", "error_message": null },
            "data": null
        });
        let envelope = validate(&raw).unwrap();
        assert_eq!(
            envelope.error,
            Some(ClientError::new(BackendErrorKind::FileError))
        );
    }

    #[test]
    fn ignores_unknown_envelope_keys() {
        let raw = json!({ "success": true, "error": null, "data": null, "trace_id": 7 });
        assert_eq!(validate(&raw).unwrap(), Envelope::empty_success());
    }

    #[test]
    fn error_and_data_are_required_keys() {
        let err = validate(&json!({ "success": true })).unwrap_err();
        assert_eq!(
            sorted_issues(&err),
            [
                ("data".to_owned(), IssueCode::MissingField),
                ("error".to_owned(), IssueCode::MissingField),
            ]
        );
    }

    #[test]
    fn root_must_be_an_object() {
        let err = validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.first().unwrap().path.is_root());
        assert_eq!(err.to_string(), "<root>: expected object, received array");
    }

    #[test]
    fn collects_every_issue() {
        let mut broken = instance_json("Modpack");
        broken["loader"] = json!("Loom");
        broken.as_object_mut().unwrap().remove("version");

        let raw = json!({
            "success": "yes",
            "error": null,
            "data": { "InstancesVec": [instance_json("ok"), broken] }
        });
        let err = validate(&raw).unwrap_err();

        assert_eq!(err.len(), 3);
        assert!(err.has_issue_at("success"));
        assert_eq!(
            err.issue_at("data.InstancesVec[1].version"),
            Some(&IssueCode::MissingField)
        );
        assert!(matches!(
            err.issue_at("data.InstancesVec[1].loader"),
            Some(IssueCode::InvalidEnumValue { received, allowed })
                if received == "Loom" && allowed.iter().any(|a| a == "NeoForge")
        ));
    }

    #[test]
    fn unknown_error_kind_is_rejected() {
        let raw = json!({
            "success": false,
            "error": { "error_type": "DiskOnFire" },
            "data": null
        });
        let err = validate(&raw).unwrap_err();
        assert!(err.has_issue_at("error.error_type"));
    }

    #[test]
    fn every_backend_error_kind_is_accepted() {
        assert_eq!(BackendErrorKind::VARIANTS.len(), 14);
        for name in BackendErrorKind::VARIANTS {
            let raw = json!({
                "success": false,
                "error": { "error_type": name, "error_message": "boom" },
                "data": null
            });
            let kind = validate(&raw).unwrap().error.unwrap().error_type;
            assert_eq!(kind.as_wire(), *name);
            assert_eq!(BackendErrorKind::from_wire(name), Some(kind));
        }
    }

    #[test]
    fn wrong_type_for_nullable_field() {
        let raw = json!({ "success": true, "error": "oops", "data": null });
        let err = validate(&raw).unwrap_err();
        assert_eq!(
            err.issue_at("error").map(ToString::to_string),
            Some("expected object or null, received string".to_owned())
        );
    }

    #[test]
    fn two_tags_are_ambiguous() {
        let raw = json!({
            "success": true,
            "error": null,
            "data": { "Instances": ["a"], "Settings": ["b"] }
        });
        let err = validate(&raw).unwrap_err();
        assert_eq!(
            sorted_issues(&err),
            [(
                "data".to_owned(),
                IssueCode::AmbiguousVariant {
                    tags: vec!["Instances".into(), "Settings".into()]
                }
            )]
        );
    }

    #[test]
    fn empty_payload_matches_nothing() {
        let raw = json!({ "success": true, "error": null, "data": {} });
        let err = validate(&raw).unwrap_err();
        assert!(matches!(
            err.issue_at("data"),
            Some(IssueCode::NoMatchingVariant { .. })
        ));
    }

    #[test]
    fn foreign_key_beside_a_tag_is_rejected() {
        let raw = json!({
            "success": true,
            "error": null,
            "data": { "Instances": ["a"], "extra": 1 }
        });
        let err = validate(&raw).unwrap_err();
        assert_eq!(
            sorted_issues(&err),
            [(
                "data".to_owned(),
                IssueCode::UnrecognizedKeys {
                    keys: vec!["extra".into()]
                }
            )]
        );
    }

    #[test]
    fn names_never_pass_as_instances() {
        let raw = json!({
            "success": true,
            "error": null,
            "data": { "InstancesVec": ["a", "b"] }
        });
        let err = validate(&raw).unwrap_err();
        assert!(err.has_issue_at("data.InstancesVec[0]"));
        assert!(err.has_issue_at("data.InstancesVec[1]"));
    }

    #[test]
    fn bytes_are_checked() {
        let raw = json!({
            "success": true,
            "error": null,
            "data": { "InstanceData": [0, 255, 256, -1, 1.5] }
        });
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.len(), 3);
        assert!(matches!(
            err.issue_at("data.InstanceData[2]"),
            Some(IssueCode::NumberOutOfRange { min: 0, max: 255, .. })
        ));
        assert!(matches!(
            err.issue_at("data.InstanceData[3]"),
            Some(IssueCode::NumberOutOfRange { .. })
        ));
        assert!(matches!(
            err.issue_at("data.InstanceData[4]"),
            Some(IssueCode::NotAnInteger { .. })
        ));
    }

    #[test]
    fn whole_float_byte_is_undecodable() {
        let raw = json!({
            "success": true,
            "error": null,
            "data": { "InstanceData": [1.0] }
        });
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.first().unwrap().path.is_root());
        assert!(matches!(
            err.first().unwrap().code,
            IssueCode::Undecodable { .. }
        ));
    }

    #[test]
    fn window_action_values() {
        let ok = json!({ "success": true, "error": null, "data": { "WindowAction": "MaximizeSuccess" } });
        assert_eq!(
            validate(&ok).unwrap().data,
            Some(ResponseData::WindowAction(WindowActionResult::MaximizeSuccess))
        );

        let bad = json!({ "success": true, "error": null, "data": { "WindowAction": "Explode" } });
        assert!(validate(&bad).unwrap_err().has_issue_at("data.WindowAction"));
    }

    #[test]
    fn tree_nests_by_path() {
        let mut broken = instance_json("x");
        broken["downloaded"] = json!("no");
        let raw = json!({
            "success": 1,
            "error": null,
            "data": { "InstancesVec": [broken] }
        });
        let tree = serde_json::to_value(validate(&raw).unwrap_err().tree()).unwrap();
        assert_eq!(
            tree,
            json!({
                "properties": {
                    "success": { "errors": ["expected boolean, received number"] },
                    "data": { "properties": { "InstancesVec": { "items": {
                        "0": { "properties": { "downloaded": {
                            "errors": ["expected boolean, received string"]
                        } } }
                    } } } }
                }
            })
        );
    }

    #[test]
    fn issues_serialize_with_code_tag() {
        let err = validate(&json!({ "success": true, "error": null })).unwrap_err();
        assert_eq!(
            serde_json::to_value(err.first().unwrap()).unwrap(),
            json!({ "path": ["data"], "code": "missing_field" })
        );
    }

    #[test]
    fn pointer_tokens_resolve_against_the_reply() {
        let raw = json!({ "data": { "0": [ { "a/b": 1 } ] } });
        let path = FieldPath::locate(&raw, "/data/0/0/a~1b");
        assert_eq!(
            path.segments(),
            [
                PathSegment::Key("data".into()),
                PathSegment::Key("0".into()),
                PathSegment::Index(0),
                PathSegment::Key("a/b".into()),
            ]
        );
        assert_eq!(path.to_string(), "data.0[0].a/b");
    }
}
