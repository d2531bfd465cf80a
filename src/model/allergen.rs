//! The allergen context: a component collection plus the search resources
//! resolution runs against.

use super::component::Component;
use super::error::Error;
use crate::proteome::Proteome;
use crate::search::SearchIndex;
use std::collections::BTreeMap;
use std::fmt;

/// Borrowed view of an allergen's search resources.
///
/// Component resolution methods take this transient view instead of the
/// owning [`Allergen`], so components never hold a back-reference and a
/// component of one allergen can be resolved against another allergen's
/// proteome (the cross-reactivity case).
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Name of the allergen context; resolution results are keyed by it.
    pub name: &'a str,
    /// Search database built from the context's proteome.
    pub search_index: &'a SearchIndex,
    /// Random-access store for full subject sequences.
    pub proteome: &'a dyn Proteome,
}

/// A whole allergen (e.g. hazelnut): its components, the search index built
/// from its proteome, and the proteome itself.
///
/// Owns its components; contexts handed out by [`context`](Self::context)
/// only borrow.
pub struct Allergen {
    pub name: String,
    pub components: BTreeMap<String, Component>,
    pub search_index: SearchIndex,
    pub proteome: Box<dyn Proteome>,
}

impl Allergen {
    pub fn new(
        name: impl Into<String>,
        search_index: SearchIndex,
        proteome: Box<dyn Proteome>,
    ) -> Self {
        Self {
            name: name.into(),
            components: BTreeMap::new(),
            search_index,
            proteome,
        }
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.insert(component.name.clone(), component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The transient context view other components resolve against.
    pub fn context(&self) -> ResolveContext<'_> {
        ResolveContext {
            name: &self.name,
            search_index: &self.search_index,
            proteome: self.proteome.as_ref(),
        }
    }

    /// Resolves homologs of every component against another allergen's
    /// context, storing results under that context's name.
    pub fn resolve_homologs_against(
        &mut self,
        other: &Allergen,
        return_sequences: bool,
    ) -> Result<(), Error> {
        let context = other.context();
        for component in self.components.values_mut() {
            component.get_homologs(&context, return_sequences)?;
        }
        Ok(())
    }

    /// Resolves each component's containing reference sequence in this
    /// allergen's own proteome.
    pub fn resolve_full_seqs(&mut self) -> Result<(), Error> {
        let context = ResolveContext {
            name: &self.name,
            search_index: &self.search_index,
            proteome: self.proteome.as_ref(),
        };
        for component in self.components.values_mut() {
            component.get_full_seq(&context)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Allergen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allergen")
            .field("name", &self.name)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("search_index", &self.search_index)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Allergen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {} components", self.name, self.components.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proteome::InMemoryProteome;
    use crate::search::DbType;

    #[test]
    fn allergen_owns_its_components() {
        let proteome: InMemoryProteome = [("ACC1", "MKT")].into_iter().collect();
        let mut allergen = Allergen::new(
            "hazelnut",
            SearchIndex::new(DbType::Protein),
            Box::new(proteome),
        );
        assert!(allergen.is_empty());
        allergen.add_component(Component::new("Cor_a_9", "MKTAYIAKQR"));
        allergen.add_component(Component::new("Cor_a_1", "GSHMRGSARA"));
        assert_eq!(allergen.len(), 2);
        assert_eq!(allergen.to_string(), "hazelnut with 2 components");

        let context = allergen.context();
        assert_eq!(context.name, "hazelnut");
        assert_eq!(context.search_index.db_type(), DbType::Protein);
        assert_eq!(context.proteome.fetch("ACC1").unwrap(), "MKT");
    }
}
