//! Data model for arbitrary runtime values captured into trace spans.
//!
//! A trace may carry values the JSON writer cannot natively represent:
//! third-party model objects with their own export conventions, plain
//! structured records, or opaque objects whose only usable form is their
//! string rendering. [`CapturedValue`] classifies a value by its
//! declared type at the instrumentation boundary; the
//! [`TraceValueEncoder`](crate::encoder::TraceValueEncoder) then picks a
//! serialization through an ordered fallback chain.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// A runtime value captured into a span attribute, classified by the
/// declared type of the object it was captured from.
#[derive(Debug)]
pub enum CapturedValue {
    /// A value the JSON writer can represent natively.
    Json(Value),
    /// An instance produced by the object-modeling integration.
    ///
    /// Instances from the integration's pre-breaking-change API surface
    /// carry their own legacy dict export; modern instances are
    /// data-validation base models and are exported as such.
    ModelObject(ModelExport),
    /// An instance of the data-validation integration's base model
    /// type.
    ValidatedModel(ModelExport),
    /// A plain structured record: named fields, no custom encoding.
    Record(Record),
    /// A sequence of captured values.
    List(Vec<CapturedValue>),
    /// Anything else, reachable only through its string rendering.
    Opaque(Opaque),
}

macro_rules! impl_trivial_from {
    ($t:ty) => {
        impl From<$t> for CapturedValue {
            fn from(val: $t) -> CapturedValue {
                CapturedValue::Json(val.into())
            }
        }
    };
}

impl_trivial_from!(i8);
impl_trivial_from!(i16);
impl_trivial_from!(i32);
impl_trivial_from!(i64);
impl_trivial_from!(u8);
impl_trivial_from!(u16);
impl_trivial_from!(u32);
impl_trivial_from!(u64);
impl_trivial_from!(f32);
impl_trivial_from!(f64);
impl_trivial_from!(bool);
impl_trivial_from!(&str);
impl_trivial_from!(String);
impl_trivial_from!(Value);

impl From<Vec<CapturedValue>> for CapturedValue {
    fn from(values: Vec<CapturedValue>) -> CapturedValue {
        CapturedValue::List(values)
    }
}

/// Snapshot of the export surfaces offered by a third-party model
/// instance.
///
/// Field maps are captured at the instrumentation boundary; which one
/// the encoder uses depends on the installed integration version. The
/// original object is never retained.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelExport {
    type_name: Cow<'static, str>,
    legacy_fields: Map<String, Value>,
    structured_fields: Option<Map<String, Value>>,
}

impl ModelExport {
    /// Capture a model instance that offers only the legacy dict-style
    /// export.
    pub fn new(type_name: impl Into<Cow<'static, str>>, legacy_fields: Map<String, Value>) -> Self {
        ModelExport {
            type_name: type_name.into(),
            legacy_fields,
            structured_fields: None,
        }
    }

    /// Attach the structured-dump export offered by the v2 validation
    /// surface.
    pub fn with_structured(mut self, fields: Map<String, Value>) -> Self {
        self.structured_fields = Some(fields);
        self
    }

    /// Name of the model's type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn legacy_fields(&self) -> &Map<String, Value> {
        &self.legacy_fields
    }

    pub(crate) fn structured_fields(&self) -> Option<&Map<String, Value>> {
        self.structured_fields.as_ref()
    }
}

impl fmt::Display for ModelExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.type_name,
            Value::Object(self.legacy_fields.clone())
        )
    }
}

/// A plain structured record: a value composed of named fields with no
/// custom encoding.
#[derive(Debug)]
pub struct Record {
    type_name: Cow<'static, str>,
    fields: Option<Vec<(String, CapturedValue)>>,
}

impl Record {
    /// Capture a record with its field names and values.
    pub fn new(
        type_name: impl Into<Cow<'static, str>>,
        fields: Vec<(String, CapturedValue)>,
    ) -> Self {
        Record {
            type_name: type_name.into(),
            fields: Some(fields),
        }
    }

    /// Capture a record whose field conversion failed at the
    /// instrumentation boundary. The encoder falls through to string
    /// conversion for such records.
    pub fn unconvertible(type_name: impl Into<Cow<'static, str>>) -> Self {
        Record {
            type_name: type_name.into(),
            fields: None,
        }
    }

    /// Name of the record's type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn fields(&self) -> Option<&[(String, CapturedValue)]> {
        self.fields.as_deref()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fields {
            Some(fields) => {
                write!(f, "{} {{ ", self.type_name)?;
                for (i, (name, _)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}")?;
                }
                write!(f, " }}")
            }
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// A captured value with no structured export, reachable only through
/// its string rendering.
///
/// The rendering stays lazy: some types have a side-effecting string
/// conversion (e.g. a streaming response whose `Display` consumes its
/// stream), and the encoder's safety gate must be able to refuse to
/// invoke it. Such values are constructed with [`Opaque::streaming`].
pub struct Opaque {
    type_name: Cow<'static, str>,
    display: Box<dyn fmt::Display + Send + Sync>,
    streaming: bool,
}

impl Opaque {
    /// Capture an opaque value with a safe string rendering.
    pub fn new(
        type_name: impl Into<Cow<'static, str>>,
        value: impl fmt::Display + Send + Sync + 'static,
    ) -> Self {
        Opaque {
            type_name: type_name.into(),
            display: Box::new(value),
            streaming: false,
        }
    }

    /// Capture an opaque value whose string rendering consumes a
    /// single-use stream and must not be invoked by the encoder.
    pub fn streaming(
        type_name: impl Into<Cow<'static, str>>,
        value: impl fmt::Display + Send + Sync + 'static,
    ) -> Self {
        Opaque {
            type_name: type_name.into(),
            display: Box::new(value),
            streaming: true,
        }
    }

    /// Name of the value's type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether the string rendering has a stream-consuming side effect.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub(crate) fn render(&self) -> String {
        self.display.to_string()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type_name", &self.type_name)
            .field("streaming", &self.streaming)
            .finish_non_exhaustive()
    }
}
