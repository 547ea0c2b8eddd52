//! Selektions-Modi für Punkte und Strukturen.

use indexmap::IndexSet;
use std::hash::Hash;

/// Wie eine neue Auswahl mit der bestehenden kombiniert wird
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Bestehende Auswahl ersetzen
    #[default]
    Replace,
    /// Vereinigung
    Join,
    /// Differenz
    Remove,
    /// Symmetrische Differenz
    Toggle,
}

impl SelectionMode {
    /// Modus aus Modifier-Tasten: Strg = Join, Alt = Remove, Strg+Alt = Toggle
    pub fn from_modifiers(ctrl: bool, alt: bool) -> Self {
        match (ctrl, alt) {
            (true, true) => SelectionMode::Toggle,
            (true, false) => SelectionMode::Join,
            (false, true) => SelectionMode::Remove,
            (false, false) => SelectionMode::Replace,
        }
    }

    /// Wendet den Modus auf eine geordnete Auswahl an
    pub fn apply<T, I>(self, selection: &mut IndexSet<T>, ids: I)
    where
        T: Hash + Eq + Copy,
        I: IntoIterator<Item = T>,
    {
        match self {
            SelectionMode::Replace => {
                selection.clear();
                selection.extend(ids);
            }
            SelectionMode::Join => selection.extend(ids),
            SelectionMode::Remove => {
                for id in ids {
                    selection.shift_remove(&id);
                }
            }
            SelectionMode::Toggle => {
                for id in ids {
                    if !selection.shift_remove(&id) {
                        selection.insert(id);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u32]) -> IndexSet<u32> {
        ids.iter().copied().collect()
    }

    #[test]
    fn modifiers_map_to_modes() {
        assert_eq!(SelectionMode::from_modifiers(false, false), SelectionMode::Replace);
        assert_eq!(SelectionMode::from_modifiers(true, false), SelectionMode::Join);
        assert_eq!(SelectionMode::from_modifiers(false, true), SelectionMode::Remove);
        assert_eq!(SelectionMode::from_modifiers(true, true), SelectionMode::Toggle);
    }

    #[test]
    fn modes_combine_sets_in_order() {
        let mut selection = set(&[1, 2, 3]);
        SelectionMode::Join.apply(&mut selection, [5, 2]);
        assert_eq!(selection, set(&[1, 2, 3, 5]));

        SelectionMode::Remove.apply(&mut selection, [2, 9]);
        assert_eq!(selection.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);

        SelectionMode::Toggle.apply(&mut selection, [3, 4]);
        assert_eq!(selection.iter().copied().collect::<Vec<_>>(), vec![1, 5, 4]);

        SelectionMode::Replace.apply(&mut selection, [7]);
        assert_eq!(selection, set(&[7]));
    }
}
