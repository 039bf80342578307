use std::any::{type_name, Any};
use std::fmt;

/// Type-erased in-memory representation of one artifact
///
/// The concrete type is chosen by the format adapter that produced it (a
/// property list tree, a list of gradle properties, raw source text, ...).
/// Mods recover it with the typed accessors.
pub struct ModResults {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl ModResults {
    pub fn new<T: Any + Send>(value: T) -> Self {
        ModResults {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the concrete type held, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Take the value out, handing the results back untouched on a type mismatch
    pub fn into_inner<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(ModResults { value, type_name }),
        }
    }
}

impl fmt::Debug for ModResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModResults<{}>", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_matches_stored_type() {
        let mut results = ModResults::new(vec!["a".to_string()]);
        assert!(results.is::<Vec<String>>());
        assert!(results.downcast_ref::<String>().is_none());

        if let Some(items) = results.downcast_mut::<Vec<String>>() {
            items.push("b".to_string());
        }
        let inner = results.into_inner::<Vec<String>>();
        assert!(inner.is_ok_and(|items| items == vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_into_inner_mismatch_returns_results() {
        let results = ModResults::new(42_u32);
        let Err(results) = results.into_inner::<String>() else {
            assert!(false, "expected a type mismatch");
            return;
        };
        assert_eq!(results.type_name(), "u32");
    }
}
