use serde_json::Value;

pub const BANNER_WIDTH: usize = 60;
pub const SECTION_WIDTH: usize = 30;

/// Line-oriented text builder for fixed-layout reports.
#[derive(Debug, Default)]
pub struct Report {
    out: String,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title followed by a `=` banner and a blank line.
    pub fn banner(&mut self, title: &str) -> &mut Self {
        self.line(title);
        self.line("=".repeat(BANNER_WIDTH));
        self.blank()
    }

    /// Heading followed by a `-` rule.
    pub fn section(&mut self, heading: &str) -> &mut Self {
        self.line(heading);
        self.line("-".repeat(SECTION_WIDTH))
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    pub fn rule(&mut self, indent: &str, width: usize) -> &mut Self {
        self.out.push_str(indent);
        self.line("-".repeat(width))
    }

    pub fn push(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    /// Close with a trailing `=` banner (no final newline).
    pub fn close(mut self) -> String {
        self.out.push('\n');
        self.out.push_str(&"=".repeat(BANNER_WIDTH));
        self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Display form of a JSON value; missing and `null` become `N/A`.
pub fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(other) => other.to_string(),
    }
}

/// `text` of `obj[key]`.
pub fn field(obj: &Value, key: &str) -> String {
    text(obj.get(key))
}

/// Like `field`, but missing values render as an empty string.
pub fn field_or_empty(obj: &Value, key: &str) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => String::new(),
        value => text(value),
    }
}

pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Short type name for error messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Non-empty array at `obj[key]`, if that is what is there.
pub fn non_empty_list<'a>(obj: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array).filter(|a| !a.is_empty())
}

/// First `max` chars of `s`, with `...` appended when something was cut.
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", crate::safe_truncate(s, max))
    } else {
        s.to_string()
    }
}
