// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block catalog: the palette of block types and their display metadata.
//!
//! The catalog only drives visual affordance. A node whose type is not in
//! the catalog is still a valid node; it renders with the fallback entry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Palette category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockCategory {
    /// Deployment and construction
    Lifecycle,
    /// Functions, modifiers and control flow
    Logic,
    /// Token movements
    Token,
    /// Ownership and permissions
    Access,
    /// Contract storage
    State,
    /// Events and off-chain data
    Integration,
    /// Anything not in the catalog
    Other,
}

impl BlockCategory {
    /// Display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lifecycle => "Lifecycle",
            Self::Logic => "Logic",
            Self::Token => "Token",
            Self::Access => "Access Control",
            Self::State => "State",
            Self::Integration => "Integration",
            Self::Other => "Other",
        }
    }

    /// Palette order
    pub fn all() -> &'static [BlockCategory] {
        &[
            Self::Lifecycle,
            Self::Logic,
            Self::Token,
            Self::Access,
            Self::State,
            Self::Integration,
        ]
    }
}

/// Display metadata for one block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Type identifier stored on nodes
    pub id: String,
    /// Display name
    pub name: String,
    /// Icon name
    pub icon: String,
    /// Category
    pub category: BlockCategory,
    /// Accent color
    pub color: [u8; 3],
    /// Palette tooltip
    pub description: String,
}

impl BlockDefinition {
    /// Create a definition whose display name is its id
    pub fn new(
        id: &str,
        icon: &str,
        category: BlockCategory,
        color: [u8; 3],
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            icon: icon.to_string(),
            category,
            color,
            description: description.to_string(),
        }
    }

    /// Color as a `#rrggbb` string
    pub fn hex_color(&self) -> String {
        let [r, g, b] = self.color;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Registry of available block types
#[derive(Debug, Clone)]
pub struct BlockCatalog {
    blocks: IndexMap<String, BlockDefinition>,
    fallback: BlockDefinition,
}

impl BlockCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            blocks: IndexMap::new(),
            fallback: BlockDefinition::new("Block", "box", BlockCategory::Other, [128, 128, 128], ""),
        }
    }

    /// Register a block type, replacing any previous entry with the same id
    pub fn register(&mut self, block: BlockDefinition) {
        self.blocks.insert(block.id.clone(), block);
    }

    /// Get a block type by ID
    pub fn get(&self, id: &str) -> Option<&BlockDefinition> {
        self.blocks.get(id)
    }

    /// Get a block type by ID, or the fallback entry
    pub fn resolve(&self, id: &str) -> &BlockDefinition {
        self.get(id).unwrap_or(&self.fallback)
    }

    /// Check whether a block type is registered
    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    /// Get all registered block types in palette order
    pub fn blocks(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks.values()
    }

    /// Get block types by category
    pub fn in_category(&self, category: BlockCategory) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks.values().filter(move |b| b.category == category)
    }

    /// Number of registered block types
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The smart-contract block palette
    pub fn smart_contract() -> Self {
        use BlockCategory::*;

        let mut catalog = Self::new();
        let blocks = [
            ("Deploy", "rocket", Lifecycle, [99, 102, 241], "Deploy the contract to a network"),
            ("Constructor", "hammer", Lifecycle, [129, 140, 248], "Initialize contract state on deployment"),
            ("Function", "code", Logic, [59, 130, 246], "Callable contract function"),
            ("Modifier", "filter", Logic, [14, 165, 233], "Reusable precondition for functions"),
            ("Condition", "git-branch", Logic, [6, 182, 212], "Branch on a boolean expression"),
            ("Loop", "repeat", Logic, [20, 184, 166], "Iterate over a bounded range"),
            ("Transfer", "send", Token, [16, 185, 129], "Move tokens between accounts"),
            ("Mint", "coins", Token, [34, 197, 94], "Create new tokens"),
            ("Burn", "flame", Token, [249, 115, 22], "Destroy tokens"),
            ("Approve", "check-circle", Token, [132, 204, 22], "Allow a spender to move tokens"),
            ("Ownable", "key", Access, [234, 179, 8], "Restrict calls to the owner"),
            ("Pausable", "pause-circle", Access, [245, 158, 11], "Emergency stop switch"),
            ("Storage", "database", State, [168, 85, 247], "Persistent state variable"),
            ("Mapping", "table", State, [192, 132, 252], "Key to value storage"),
            ("Event", "bell", Integration, [236, 72, 153], "Emit a log entry"),
            ("Oracle", "globe", Integration, [244, 63, 94], "Read off-chain data"),
        ];
        for (id, icon, category, color, description) in blocks {
            catalog.register(BlockDefinition::new(id, icon, category, color, description));
        }
        catalog
    }
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::smart_contract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = BlockCatalog::default();
        assert_eq!(catalog.len(), 16);
        assert!(catalog.contains("Deploy"));
        assert_eq!(catalog.get("Transfer").unwrap().category, BlockCategory::Token);
        for category in BlockCategory::all() {
            assert!(catalog.in_category(*category).count() > 0, "{category:?} is empty");
        }
    }

    #[test]
    fn test_resolve_falls_back() {
        let catalog = BlockCatalog::default();
        let block = catalog.resolve("Teleport");
        assert_eq!(block.category, BlockCategory::Other);
        assert_eq!(catalog.resolve("Mint").id, "Mint");
    }

    #[test]
    fn test_hex_color() {
        let block = BlockDefinition::new("X", "box", BlockCategory::Other, [255, 0, 16], "");
        assert_eq!(block.hex_color(), "#ff0010");
    }
}
