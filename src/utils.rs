use rand::Rng;
use regex::Regex;

pub(crate) trait LetChain {
    fn let_<F, R>(self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(Self) -> R;
}
impl<T> LetChain for T {
    #[inline]
    fn let_<F, R>(self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

pub(crate) trait AlsoChain {
    fn also_<F, R>(self, f: F) -> Self
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> R;
}
impl<T> AlsoChain for T {
    #[inline]
    fn also_<F, R>(mut self, f: F) -> Self
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> R,
    {
        f(&mut self);
        self
    }
}

::lazy_static::lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new("[^a-z0-9]").unwrap();
    static ref SLUG_SYMBOLS: Regex = Regex::new(r"[^a-zA-Z\d\s]+").unwrap();
    static ref SLUG_SPACE: Regex = Regex::new(r"\s").unwrap();
}

/// first initial + last name + 4 random digits, e.g. `alovelace4821`.
pub fn create_username(full_name: &str) -> String {
    create_username_with(full_name, &mut ::rand::thread_rng())
}

pub fn create_username_with(full_name: &str, rng: &mut impl Rng) -> String {
    let parts = full_name.split_whitespace().collect::<Vec<_>>();

    let base = match parts.as_slice() {
        [] => String::new(),
        [only] if only.chars().count() <= 2 => only.to_lowercase(),
        [first, .., last] => first
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect::<String>())
            .unwrap_or_default()
            .also_(|s| s.push_str(&last.to_lowercase())),
        [first] => first
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect::<String>())
            .unwrap_or_default(),
    };

    let mut username = NON_ALNUM.replace_all(&base, "").into_owned();
    username.push_str(&rng.gen_range(1000..=9999).to_string());

    username
}

/// `"Hello, World!"` -> `"hello--world-"`; every whitespace becomes its own dash.
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let replaced = SLUG_SYMBOLS.replace_all(&lowered, "-");

    SLUG_SPACE.replace_all(&replaced, "-").into_owned()
}
