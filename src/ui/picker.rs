//! Selection state for the modal model picker

#[derive(Debug, Clone)]
pub struct PickerItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct PickerState {
    pub title: String,
    pub items: Vec<PickerItem>,
    pub selected: usize,
}

impl PickerState {
    pub fn new<T: Into<String>>(title: T, items: Vec<PickerItem>, selected: usize) -> Self {
        Self {
            title: title.into(),
            items,
            selected,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.items.get(self.selected).map(|i| i.id.as_str())
    }

    pub fn move_up(&mut self) {
        if !self.items.is_empty() {
            if self.selected == 0 {
                self.selected = self.items.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn move_down(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker_with(ids: &[&str]) -> PickerState {
        let items = ids
            .iter()
            .map(|id| PickerItem {
                id: id.to_string(),
                label: id.to_string(),
            })
            .collect();
        PickerState::new("Select Model", items, 0)
    }

    #[test]
    fn movement_wraps_around_both_ends() {
        let mut picker = picker_with(&["a", "b", "c"]);

        picker.move_up();
        assert_eq!(picker.selected_id(), Some("c"));

        picker.move_down();
        assert_eq!(picker.selected_id(), Some("a"));

        picker.move_down();
        picker.move_down();
        picker.move_down();
        assert_eq!(picker.selected_id(), Some("a"));
    }

    #[test]
    fn empty_picker_has_no_selection() {
        let mut picker = picker_with(&[]);

        picker.move_up();
        picker.move_down();
        assert_eq!(picker.selected_id(), None);
    }
}
