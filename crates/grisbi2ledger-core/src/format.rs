use std::fmt::{self, Display, Formatter};

/// Write every item of `container` with `item_fmt`, separated by `separator`
pub(crate) fn format<C, T, F>(
    f: &mut Formatter<'_>,
    container: C,
    item_fmt: F,
    separator: &'static str,
) -> fmt::Result
where
    C: IntoIterator<Item = T>,
    F: Fn(&mut Formatter<'_>, T) -> fmt::Result,
{
    let mut container = container.into_iter();
    if let Some(item) = container.by_ref().next() {
        item_fmt(f, item)?;
    }

    for item in container {
        f.write_str(separator)?;
        item_fmt(f, item)?;
    }

    Ok(())
}

/// Format plain.
pub(crate) fn plain<S>(f: &mut Formatter<'_>, s: S) -> fmt::Result
where
    S: Display,
{
    write!(f, "{s}")
}

/// Format in double quotes.
pub(crate) fn double_quoted<S>(f: &mut Formatter<'_>, s: S) -> fmt::Result
where
    S: Display,
{
    write!(f, "\"{s}\"")
}

pub(crate) const COMMA: &str = ", ";
pub(crate) const INDENT: &str = "\t";
pub(crate) const GUTTER: &str = "  ";
