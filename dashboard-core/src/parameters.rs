use crate::{HourlyParameter, error::SelectionError};

/// Hourly parameters compared side by side.
pub const MAX_SELECTED_PARAMETERS: usize = 2;

/// Ordered pick of hourly parameters for the insights view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSelection {
    selected: Vec<HourlyParameter>,
}

impl ParameterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from parameter keys, in order.
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Result<Self, SelectionError> {
        let mut selection = Self::new();
        for key in keys {
            selection.select(HourlyParameter::try_from(key.as_ref())?)?;
        }
        Ok(selection)
    }

    /// Adds a parameter. Re-selecting one already chosen is a no-op.
    pub fn select(&mut self, parameter: HourlyParameter) -> Result<(), SelectionError> {
        if self.selected.contains(&parameter) {
            return Ok(());
        }
        if self.is_full() {
            return Err(SelectionError::Full { max: MAX_SELECTED_PARAMETERS });
        }
        self.selected.push(parameter);
        Ok(())
    }

    pub fn remove(&mut self, parameter: HourlyParameter) {
        self.selected.retain(|p| *p != parameter);
    }

    pub fn is_selected(&self, parameter: HourlyParameter) -> bool {
        self.selected.contains(&parameter)
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= MAX_SELECTED_PARAMETERS
    }

    /// Options that can no longer be picked.
    pub fn is_disabled(&self, parameter: HourlyParameter) -> bool {
        self.is_full() && !self.is_selected(parameter)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn as_slice(&self) -> &[HourlyParameter] {
        &self.selected
    }

    /// Two parameters on different scales need a second axis.
    pub fn uses_dual_axis(&self) -> bool {
        match self.selected.as_slice() {
            [a, b] => a.axis() != b.axis(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_parameter_is_rejected() {
        let mut sel = ParameterSelection::new();
        sel.select(HourlyParameter::Temperature).unwrap();
        sel.select(HourlyParameter::WindSpeed).unwrap();

        let err = sel.select(HourlyParameter::Precipitation).unwrap_err();
        assert_eq!(err, SelectionError::Full { max: 2 });
        assert_eq!(sel.as_slice(), &[HourlyParameter::Temperature, HourlyParameter::WindSpeed]);
    }

    #[test]
    fn duplicate_select_is_noop() {
        let mut sel = ParameterSelection::new();
        sel.select(HourlyParameter::Temperature).unwrap();
        sel.select(HourlyParameter::Temperature).unwrap();

        assert_eq!(sel.as_slice().len(), 1);
    }

    #[test]
    fn disabled_only_when_full() {
        let mut sel = ParameterSelection::new();
        sel.select(HourlyParameter::Temperature).unwrap();
        assert!(!sel.is_disabled(HourlyParameter::PressureMsl));

        sel.select(HourlyParameter::RelativeHumidity).unwrap();
        assert!(sel.is_disabled(HourlyParameter::PressureMsl));
        assert!(!sel.is_disabled(HourlyParameter::Temperature));

        sel.remove(HourlyParameter::Temperature);
        assert!(!sel.is_disabled(HourlyParameter::PressureMsl));
    }

    #[test]
    fn dual_axis_depends_on_axis_group() {
        let same = ParameterSelection::from_keys(&["temperature_2m", "apparent_temperature"]).unwrap();
        assert!(!same.uses_dual_axis());

        let mixed = ParameterSelection::from_keys(&["temperature_2m", "pressure_msl"]).unwrap();
        assert!(mixed.uses_dual_axis());
    }

    #[test]
    fn from_keys_propagates_unknown() {
        let err = ParameterSelection::from_keys(&["visibility"]).unwrap_err();
        assert!(matches!(err, SelectionError::UnknownParameter(_)));
    }
}
