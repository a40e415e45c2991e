use itertools::Itertools;
use std::fmt::Display;

pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .map(std::primitive::char::to_lowercase)
        .flatten()
        .eq(b.chars().map(std::primitive::char::to_lowercase).flatten())
}

pub fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
}

pub fn join_display<T: Display>(items: impl IntoIterator<Item = T>, sep: &str) -> String {
    items.into_iter().map(|item| item.to_string()).join(sep)
}
