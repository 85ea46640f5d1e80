//! Enums for the command line interface.
//!
//! For each enum, we allow the user to specify the enum either using the whole string or any substring
//! which fully determines the choice. We additionally add a few extra aliases if other natural ones exist.

use clap::ValueEnum;
use clap::builder::PossibleValue;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendOptions {
    Cleartext,
    Additive,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PresetOptions {
    KoalaBear16,
}

/// Produce a collection of PossibleValue's for an Enum variant.
///
/// We allow any prefix of the full name which uniquely determines the variant.
/// We additionally allow the user to specify a collection of aliases which are
/// not prefixes. For each alias, we also allow any unique prefix of that alias.
///
/// For example, for the `KoalaBear16` variant of `PresetOptions`, running
/// `get_aliases("koala-bear-16", 1, Some(vec![("kb16", 2)]))` produces the following set of
/// allowed strings:
///
/// ```text
/// k, ko, koa, koal, koala, koala-, koala-b, ..., koala-bear-16, kb, kb1, kb16
/// ```
fn get_aliases(
    base: &'static str,
    min_unique_base_prefix: usize,
    alias: Option<Vec<(&'static str, usize)>>,
) -> PossibleValue {
    let prefixes = (min_unique_base_prefix..base.len()).map(|i| &base[..i]);
    match alias {
        None => PossibleValue::new(base).aliases(prefixes),
        Some(vec) => PossibleValue::new(base).aliases(prefixes.chain(vec.into_iter().flat_map(
            |(alias, min_unique)| (min_unique..alias.len() + 1).map(|i| &alias[..i]),
        ))),
    }
}

impl ValueEnum for BackendOptions {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Cleartext, Self::Additive]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::Cleartext => get_aliases("cleartext", 1, Some(vec![("plain", 1)])),
            Self::Additive => get_aliases("additive", 1, Some(vec![("shared", 1)])),
        })
    }
}

impl ValueEnum for PresetOptions {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::KoalaBear16]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::KoalaBear16 => get_aliases("koala-bear-16", 1, Some(vec![("kb16", 2)])),
        })
    }
}
