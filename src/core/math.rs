use crate::common::span::Span;
use crate::construct::trace::{ErrorKind, Trace};
use crate::construct::value::Value;

pub fn sqrt(args: Vec<Value>, span: &Span) -> Result<Value, Trace> {
    let x = args[0]
        .as_number()
        .ok_or_else(|| type_error(&args[0], span))?;
    if x < 0.0 {
        return Err(Trace::new(ErrorKind::TypeError("sqrt of a negative number".to_string()), span.clone()));
    }
    Ok(Value::Float(x.sqrt()))
}

fn type_error(got: &Value, span: &Span) -> Trace {
    Trace::new(ErrorKind::TypeError(format!("sqrt expects a number, got {}", got.type_name())), span.clone())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;

    fn here() -> Span {
        Span::point(&Source::inline(""), 1, 0)
    }

    #[test]
    fn sqrt_of_perfect_square() {
        let result = sqrt(vec![Value::Int(9)], &here()).unwrap();
        assert_eq!(result, Value::Float(3.0));
    }

    #[test]
    fn sqrt_rejects_negative_input() {
        assert!(sqrt(vec![Value::Int(-1)], &here()).is_err());
    }

    #[test]
    fn sqrt_rejects_non_numeric_input() {
        assert!(sqrt(vec![Value::Bool(true)], &here()).is_err());
    }
}
