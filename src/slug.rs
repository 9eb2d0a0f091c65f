use std::future::Future;

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> =
	Lazy::new(|| Regex::new("[^a-z0-9]+").expect("slug separator pattern is valid"));

/// Turns a title into its base slug: lower-cased, with every run of characters
/// outside `[a-z0-9]` collapsed into one hyphen and no hyphens at either end.
///
/// The result may be empty when the title has no ASCII letters or digits.
pub fn slugify(title: &str) -> String {
	let lowered = title.to_lowercase();

	SEPARATORS
		.replace_all(&lowered, "-")
		.trim_matches('-')
		.to_owned()
}

/// Finds the first free slug for `base`, trying `base`, `base-1`, `base-2`, ...
///
/// `exists` reports whether a candidate is already taken. Its errors are returned
/// as-is and end the search.
pub async fn unique<F, Fut, E>(base: &str, mut exists: F) -> Result<String, E>
where
	F: FnMut(String) -> Fut,
	Fut: Future<Output = Result<bool, E>>,
{
	let mut candidate = base.to_owned();
	let mut counter: u64 = 1;

	while exists(candidate.clone()).await? {
		candidate = format!("{base}-{counter}");
		counter += 1;
	}

	Ok(candidate)
}
