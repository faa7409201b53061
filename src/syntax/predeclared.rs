//! The Go universe scope: names that resolve to the `builtin` pseudo-package.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predeclared
{
    Type,
    Constant,
    Function,
}

/// Classify `name` if it is one of the predeclared identifiers.
pub fn lookup(name: &str) -> Option<Predeclared>
{
    let kind = match name
    {
        "any" | "bool" | "byte" | "comparable" | "complex128" | "complex64" | "error"
        | "float32" | "float64" | "int" | "int16" | "int32" | "int64" | "int8" | "rune"
        | "string" | "uint" | "uint16" | "uint32" | "uint64" | "uint8" | "uintptr" =>
        {
            Predeclared::Type
        }

        "true" | "false" | "iota" | "nil" => Predeclared::Constant,

        "append" | "cap" | "clear" | "close" | "complex" | "copy" | "delete" | "imag"
        | "len" | "make" | "max" | "min" | "new" | "panic" | "print" | "println" | "real"
        | "recover" => Predeclared::Function,

        _ => return None,
    };

    Some(kind)
}

pub fn is_predeclared(name: &str) -> bool
{
    lookup(name).is_some()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn universe_scope_matrix()
    {
        assert_eq!(lookup("int"), Some(Predeclared::Type));
        assert_eq!(lookup("iota"), Some(Predeclared::Constant));
        assert_eq!(lookup("append"), Some(Predeclared::Function));
        assert_eq!(lookup("Int"), None);
        assert!(!is_predeclared("fmt"));
    }
}
