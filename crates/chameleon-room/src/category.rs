//! Word categories: where secret words come from.
//!
//! A [`Category`] is a themed list of entries shown to every player; one
//! entry is drawn as the round's secret word. The engine asks a
//! [`CategoryProvider`] for a category each time a round starts.

use rand::Rng;

/// Supplies a category for each new round.
///
/// `Send + Sync + 'static` because the provider lives inside the engine,
/// which is shared across connection tasks for the life of the server.
///
/// # Example
///
/// ```rust
/// use chameleon_room::{Category, CategoryProvider};
///
/// /// Always plays the same category.
/// struct Colours;
///
/// impl CategoryProvider for Colours {
///     fn pick(&self) -> Category {
///         Category::new("Colours", ["Red", "Green", "Blue"])
///             .expect("non-empty")
///     }
/// }
///
/// assert_eq!(Colours.pick().entries().len(), 3);
/// ```
pub trait CategoryProvider: Send + Sync + 'static {
    /// Chooses the category for the next round.
    fn pick(&self) -> Category;
}

/// A themed, non-empty list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    entries: Vec<String>,
}

impl Category {
    /// Builds a category, or `None` if `entries` is empty.
    pub fn new<I, S>(name: impl Into<String>, entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        if entries.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            entries,
        })
    }

    fn from_static(name: &str, entries: &[&str]) -> Self {
        debug_assert!(!entries.is_empty());
        Self {
            name: name.to_owned(),
            entries: entries.iter().map(|e| (*e).to_owned()).collect(),
        }
    }

    /// The category's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A copy of every entry, in display order.
    ///
    /// Returns an owned `Vec` so nothing a caller does to it can reach
    /// back into the category.
    pub fn entries(&self) -> Vec<String> {
        self.entries.clone()
    }

    /// Number of entries. Never zero.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; categories are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One entry chosen uniformly at random.
    pub fn random_entry(&self) -> String {
        let index = rand::rng().random_range(0..self.entries.len());
        self.entries[index].clone()
    }

    /// The 4×4 fairy-tale board.
    pub fn fairy_tales() -> Self {
        Self::from_static(
            "Fairy Tales",
            &[
                "Cinderella",
                "Goldilocks",
                "Jack and the Beanstalk",
                "Hare and the Tortoise",
                "Snow White",
                "Rapunzel",
                "Aladdin",
                "Princess and the Pea",
                "Peter Pan",
                "Little Red Riding Hood",
                "Pinocchio",
                "Beauty and the Beast",
                "Sleeping Beauty",
                "Hansel and Gretel",
                "Gingerbread Man",
                "Three Little Pigs",
            ],
        )
    }

    /// The 4×4 food board.
    pub fn food() -> Self {
        Self::from_static(
            "Food",
            &[
                "Pizza",
                "Potatoes",
                "Fish",
                "Cake",
                "Pasta",
                "Salad",
                "Soup",
                "Bread",
                "Eggs",
                "Cheese",
                "Fruit",
                "Chicken",
                "Sausage",
                "Ice Cream",
                "Chocolate",
                "Beef",
            ],
        )
    }
}

/// A single category is a provider that always plays itself.
impl CategoryProvider for Category {
    fn pick(&self) -> Category {
        self.clone()
    }
}

/// The categories that ship with the game, chosen uniformly per round.
#[derive(Debug, Clone)]
pub struct BuiltinCategories {
    categories: Vec<Category>,
}

impl Default for BuiltinCategories {
    fn default() -> Self {
        Self {
            categories: vec![Category::fairy_tales(), Category::food()],
        }
    }
}

impl CategoryProvider for BuiltinCategories {
    fn pick(&self) -> Category {
        let index = rand::rng().random_range(0..self.categories.len());
        self.categories[index].clone()
    }
}
