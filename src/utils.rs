/// Strips module paths and generic arguments from a `std::any::type_name` string.
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let name = match name.find('<') {
        Some(index) => &name[..index],
        None => name,
    };
    match name.rfind("::") {
        Some(index) => &name[index + 2..],
        None => name,
    }
}

/// Is `name` a plain identifier, as opposed to a tuple, array or slice type?
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Is this an exported (upper case) name?
pub(crate) fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
