//! Tab Order
//!
//! The user can rearrange the bottom navigation tabs. The stored order is
//! normalised on load: unknown and duplicate entries are dropped and tabs
//! missing from storage are appended in their default position order.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by tab order changes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TabOrderError {
    /// A stored tab name is not recognised.
    #[error("unknown tab {0}")]
    UnknownTab(String),

    /// The target position is past the last tab (position, tab count).
    #[error("position {0} is out of range for {1} tabs")]
    OutOfRange(usize, usize),
}

/// A bottom navigation tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Listings feed.
    Listings,

    /// Shopping basket.
    Basket,

    /// Messenger dialogs.
    Messenger,

    /// Order history.
    Orders,

    /// User profile.
    Profile,
}

impl Tab {
    /// Every tab, in default order.
    pub const ALL: [Tab; 5] = [
        Tab::Listings,
        Tab::Basket,
        Tab::Messenger,
        Tab::Orders,
        Tab::Profile,
    ];

    /// Storage name of the tab.
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Listings => "listings",
            Tab::Basket => "basket",
            Tab::Messenger => "messenger",
            Tab::Orders => "orders",
            Tab::Profile => "profile",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = TabOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| TabOrderError::UnknownTab(s.to_string()))
    }
}

/// The order tabs are shown in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOrder {
    tabs: Vec<Tab>,
}

impl Default for TabOrder {
    fn default() -> Self {
        Self {
            tabs: Tab::ALL.to_vec(),
        }
    }
}

impl TabOrder {
    /// Rebuild an order from stored names.
    pub fn from_stored<I, S>(stored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tabs: Vec<Tab> = Vec::with_capacity(Tab::ALL.len());

        for tab in stored
            .into_iter()
            .filter_map(|name| name.as_ref().parse::<Tab>().ok())
        {
            if !tabs.contains(&tab) {
                tabs.push(tab);
            }
        }

        for tab in Tab::ALL {
            if !tabs.contains(&tab) {
                tabs.push(tab);
            }
        }

        Self { tabs }
    }

    /// Move `tab` so it ends up at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`TabOrderError::OutOfRange`] if `position` is past the last tab.
    pub fn move_tab(&mut self, tab: Tab, position: usize) -> Result<(), TabOrderError> {
        if position >= self.tabs.len() {
            return Err(TabOrderError::OutOfRange(position, self.tabs.len()));
        }

        self.tabs.retain(|existing| *existing != tab);
        self.tabs.insert(position, tab);

        Ok(())
    }

    /// Position of a tab.
    pub fn position(&self, tab: Tab) -> Option<usize> {
        self.tabs.iter().position(|existing| *existing == tab)
    }

    /// Tabs in display order.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }
}
