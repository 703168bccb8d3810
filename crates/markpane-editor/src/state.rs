//! Controlled/uncontrolled value merging
//!
//! A value the host may own ("controlled") or leave to the component
//! ("uncontrolled"). The merged value follows the controlled one while it is
//! set; otherwise it follows uncontrolled updates.

#[derive(Debug, Clone, PartialEq)]
pub struct MergedState<T> {
    controlled: Option<T>,
    merged: T,
}

impl<T: Clone + PartialEq> MergedState<T> {
    pub fn new(controlled: Option<T>, uncontrolled: T) -> Self {
        let merged = controlled.clone().unwrap_or(uncontrolled);
        Self { controlled, merged }
    }

    pub fn get(&self) -> &T {
        &self.merged
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled.is_some()
    }

    /// Update the controlled value. Setting `None` keeps the current merged
    /// value until the next uncontrolled update. Returns whether the merged
    /// value changed.
    pub fn set_controlled(&mut self, value: Option<T>) -> bool {
        self.controlled = value.clone();
        match value {
            Some(value) => self.replace(value),
            None => false,
        }
    }

    /// Update the uncontrolled value; ignored while controlled.
    pub fn set_uncontrolled(&mut self, value: T) -> bool {
        if self.is_controlled() {
            return false;
        }
        self.replace(value)
    }

    fn replace(&mut self, value: T) -> bool {
        if self.merged == value {
            return false;
        }
        self.merged = value;
        true
    }
}
