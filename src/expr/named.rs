use bson::Bson;

use crate::errors::QueryError;
use crate::types::{Order, TypeArg};

use super::core::Expr;

/// Name-based dispatch used for data-driven construction, and as the
/// fall-through target when [`crate::Builder::apply_named`] does not
/// recognize a verb of its own. A miss is `UnknownMethod`.
impl Expr {
    /// # Errors
    /// `UnknownMethod` when `method` matches nothing; `InvalidArgument` when
    /// the value does not fit the operator (e.g. a non-array for `is_in`);
    /// plus whatever the resolved method itself raises.
    pub fn apply_named(&mut self, method: &str, value: Bson) -> Result<&mut Self, QueryError> {
        match method {
            "field" => Ok(self.field(into_string(method, value)?)),
            "equals" => Ok(self.equals(value)),
            "ne" | "not_equals" => Ok(self.ne(value)),
            "gt" => Ok(self.gt(value)),
            "gte" => Ok(self.gte(value)),
            "lt" => Ok(self.lt(value)),
            "lte" => Ok(self.lte(value)),
            "size" => Ok(self.apply_operator("$size", value)),
            "exists" => Ok(self.exists(into_bool(method, value)?)),
            "is_type" => self.is_type(into_type_arg(method, value)?),
            "regex" => Ok(self.regex(&into_string(method, value)?)),
            "is_in" => Ok(self.is_in(into_array(method, value)?)),
            "is_not_in" => Ok(self.is_not_in(into_array(method, value)?)),
            "all" => Ok(self.all(into_array(method, value)?)),
            "is_not" => Ok(self.is_not(value)),
            "elem_match" => Ok(self.elem_match(value)),
            "each" => Ok(self.each(into_array(method, value)?)),
            "position" => Ok(self.apply_operator("$position", value)),
            "slice" => Ok(self.slice(value)),
            "range" => {
                let [start, end] = into_pair(method, value)?;
                Ok(self.range(start, end))
            }
            "is_null" => Ok(self.is_null()),
            "not_null" => Ok(self.not_null()),
            "bits_all_set" => self.bits_all_set(value),
            "bits_all_clear" => self.bits_all_clear(value),
            "add_and" => Ok(self.add_and(value)),
            "add_or" => Ok(self.add_or(value)),
            "add_nor" => Ok(self.add_nor(value)),
            "sort" => {
                let spec = into_sort_spec(method, value)?;
                Ok(self.sort_many(spec))
            }
            "text" => Ok(self.text(&into_string(method, value)?)),
            "case_sensitive" => self.case_sensitive(into_bool(method, value)?),
            "comment" => Ok(self.comment(&into_string(method, value)?)),
            "where_js" => Ok(self.where_js(&into_string(method, value)?)),
            "set" => self.set(value, true),
            "unset" => self.unset(),
            "inc" => self.inc(value),
            "mul" => self.mul(value),
            "min" => self.min(value),
            "max" => self.max(value),
            "rename" => self.rename(&into_string(method, value)?),
            "set_on_insert" => self.set_on_insert(value),
            "current_date" => self.current_date(&into_string(method, value)?),
            "bit_and" => self.bit_and(value),
            "bit_or" => self.bit_or(value),
            "push" => self.push(value),
            "push_all" => self.push_all(into_array(method, value)?),
            "pull" => self.pull(value),
            "pull_all" => self.pull_all(into_array(method, value)?),
            "add_to_set" => self.add_to_set(value),
            "add_many_to_set" => self.add_many_to_set(into_array(method, value)?),
            "pop_first" => self.pop_first(),
            "pop_last" => self.pop_last(),
            _ => Err(QueryError::UnknownMethod(method.to_string())),
        }
    }
}

fn into_string(method: &str, value: Bson) -> Result<String, QueryError> {
    match value {
        Bson::String(s) => Ok(s),
        other => Err(QueryError::InvalidArgument(format!(
            "{method} expects a string, got {other:?}"
        ))),
    }
}

fn into_bool(method: &str, value: Bson) -> Result<bool, QueryError> {
    match value {
        Bson::Boolean(b) => Ok(b),
        other => Err(QueryError::InvalidArgument(format!(
            "{method} expects a boolean, got {other:?}"
        ))),
    }
}

fn into_array(method: &str, value: Bson) -> Result<Vec<Bson>, QueryError> {
    match value {
        Bson::Array(values) => Ok(values),
        other => Err(QueryError::InvalidArgument(format!(
            "{method} expects an array, got {other:?}"
        ))),
    }
}

fn into_pair(method: &str, value: Bson) -> Result<[Bson; 2], QueryError> {
    let values = into_array(method, value)?;
    <[Bson; 2]>::try_from(values).map_err(|values| {
        QueryError::InvalidArgument(format!(
            "{method} expects exactly two values, got {}",
            values.len()
        ))
    })
}

fn into_type_arg(method: &str, value: Bson) -> Result<TypeArg, QueryError> {
    match value {
        Bson::String(name) => Ok(TypeArg::Name(name)),
        Bson::Int32(code) => Ok(TypeArg::Code(code)),
        Bson::Int64(code) => Ok(TypeArg::Code(code as i32)),
        other => Err(QueryError::InvalidArgument(format!(
            "{method} expects a type name or code, got {other:?}"
        ))),
    }
}

fn into_sort_spec(method: &str, value: Bson) -> Result<Vec<(String, Order)>, QueryError> {
    let Bson::Document(doc) = value else {
        return Err(QueryError::InvalidArgument(format!(
            "{method} expects a document of field orders"
        )));
    };
    let mut spec = Vec::with_capacity(doc.len());
    for (field, order) in doc {
        let order = match order {
            Bson::String(s) => Order::from(s.as_str()),
            Bson::Int32(n) => Order::from(n),
            Bson::Int64(n) => Order::from(if n < 0 { -1 } else { 1 }),
            other => {
                return Err(QueryError::InvalidArgument(format!(
                    "{method} order for {field:?} must be a string or integer, got {other:?}"
                )));
            }
        };
        spec.push((field, order));
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn named_dispatch_matches_fluent_calls() {
        let mut named = Expr::new();
        named.apply_named("field", "age".into()).unwrap();
        named.apply_named("gte", 21.into()).unwrap();
        named.apply_named("is_type", "integer32".into()).unwrap();

        let mut fluent = Expr::new();
        fluent.field("age").gte(21).is_type("integer32").unwrap();

        assert_eq!(named.filter(), fluent.filter());
    }

    #[test]
    fn named_miss_is_unknown_method() {
        let mut expr = Expr::new();
        let err = expr.apply_named("frobnicate", Bson::Null).unwrap_err();
        assert!(matches!(err, QueryError::UnknownMethod(name) if name == "frobnicate"));
    }

    #[test]
    fn named_array_operators_reject_scalars() {
        let mut expr = Expr::new();
        expr.field("tags");
        assert!(matches!(
            expr.apply_named("is_in", Bson::Int32(3)).unwrap_err(),
            QueryError::InvalidArgument(_)
        ));
    }

    #[test]
    fn named_sort_accepts_mixed_orders() {
        let mut expr = Expr::new();
        expr.apply_named("sort", doc! { "a": "asc", "b": -1 }.into()).unwrap();
        assert_eq!(expr.filter(), &doc! { "$sort": { "a": 1, "b": -1 } });
    }
}
