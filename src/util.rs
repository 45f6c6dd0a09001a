use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn given_name(name: &str) -> &str {
    name.split_once(' ').map(|(first, _)| first).unwrap_or(name)
}

pub fn format_lifespan(birth_year: Option<i32>) -> String {
    match birth_year {
        Some(year) => format!("b. {year}"),
        None => String::new(),
    }
}

pub fn stable_unit(id: &str) -> f32 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();
    ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_name_splits_on_first_space() {
        assert_eq!(given_name("Ada Quinn Byrne"), "Ada");
        assert_eq!(given_name("Solo"), "Solo");
    }

    #[test]
    fn stable_unit_is_deterministic_and_bounded() {
        let a = stable_unit("p-001");
        let b = stable_unit("p-001");
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a));
    }
}
