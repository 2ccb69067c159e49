use serde_json::{Map, Value};

/// Declared layout of a stored document.
enum Shape {
    Any,
    Object(&'static [(&'static str, Shape)]),
    Array(&'static Shape),
}

const CITATION: Shape = Shape::Object(&[
    ("title", Shape::Any),
    ("source", Shape::Any),
    ("url", Shape::Any),
]);

const CONCERN: Shape = Shape::Object(&[
    ("ingredient", Shape::Any),
    ("reason", Shape::Any),
    ("citations", Shape::Array(&CITATION)),
]);

const NUTRITIONAL_INFO: Shape = Shape::Object(&[
    ("calories", Shape::Any),
    ("protein", Shape::Any),
    ("carbs", Shape::Any),
    ("sugars", Shape::Any),
    ("fat", Shape::Any),
    ("sodium", Shape::Any),
    ("additionalInfo", Shape::Any),
]);

const ALTERNATIVE: Shape = Shape::Object(&[
    ("original", Shape::Any),
    ("suggestion", Shape::Any),
    ("benefits", Shape::Any),
]);

const ANALYSIS_RESULT: Shape = Shape::Object(&[
    ("id", Shape::Any),
    ("timestamp", Shape::Any),
    ("imageUrl", Shape::Any),
    ("ingredients", Shape::Any),
    ("isHealthy", Shape::Any),
    ("concerns", Shape::Array(&CONCERN)),
    ("nutritionalInfo", NUTRITIONAL_INFO),
    ("alternatives", Shape::Array(&ALTERNATIVE)),
    ("userId", Shape::Any),
]);

/// Fills every declared field missing from an analysis document with an
/// explicit `null`. Present values and undeclared fields are kept as is.
pub fn sanitize(document: Value) -> Value {
    fill(document, &ANALYSIS_RESULT)
}

fn fill(value: Value, shape: &Shape) -> Value {
    match (value, shape) {
        (Value::Object(object), Shape::Object(fields)) => {
            Value::Object(fill_object(object, fields))
        }
        (Value::Array(items), Shape::Array(item_shape)) => Value::Array(
            items
                .into_iter()
                .map(|item| fill(item, item_shape))
                .collect(),
        ),
        (value, _) => value,
    }
}

fn fill_object(
    mut object: Map<String, Value>,
    fields: &[(&'static str, Shape)],
) -> Map<String, Value> {
    for (name, field_shape) in fields {
        let value = object.remove(*name).unwrap_or(Value::Null);
        object.insert((*name).to_string(), fill(value, field_shape));
    }
    object
}
