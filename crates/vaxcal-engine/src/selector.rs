//! Cascading vaccine / window / dose selection
//!
//! Manual record entry lets the operator pick a vaccine, a calendar window
//! and a dose number in any order. The three choices constrain each other,
//! so every change runs through a pure transition function that narrows or
//! clears the other two fields and keeps the triple internally consistent.
//! The selector is a plain value object with no rendering concerns; a UI
//! collaborator feeds it events and renders the filtered option lists.

use crate::resolver::{EligibilityResolver, SelectionMode, WindowOffer, sort_by_label};
use vaxcal_types::{CalendarWindow, VaccinationRecord};

/// Transient selection state during manual create/edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub vaccine_id: Option<String>,
    pub window_id: Option<String>,
    pub dose: Option<u32>,
}

impl SelectionState {
    /// Empty selection
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seed a selection from an existing record (for edit forms)
    pub fn from_record(record: &VaccinationRecord) -> Self {
        Self {
            vaccine_id: Some(record.vaccine_id.clone()),
            window_id: record.calendar_window_id.clone(),
            dose: Some(record.dose),
        }
    }
}

/// A single operator interaction with the selection form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Calendar window picked or cleared
    WindowChanged(Option<String>),
    /// Vaccine picked or cleared
    VaccineChanged(Option<String>),
    /// Dose number typed directly (free entry, only honored when no window
    /// constrains the selected vaccine)
    DoseChanged(u32),
}

/// The filtered option lists presented to the operator.
///
/// Always the narrowed view: windows filtered by the selected vaccine,
/// vaccines filtered by the selected window, doses filtered by both —
/// never the raw catalog.
#[derive(Debug, Clone)]
pub struct SelectionOptions<'a> {
    pub windows: Vec<&'a CalendarWindow>,
    pub vaccines: Vec<WindowOffer>,
    pub doses: Vec<u32>,
}

/// Stateful selection helper wrapping the pure transition function.
#[derive(Debug, Clone)]
pub struct CascadingSelector<'a> {
    resolver: EligibilityResolver<'a>,
    mode: SelectionMode,
    state: SelectionState,
}

impl<'a> CascadingSelector<'a> {
    /// Start an empty selection (new-record entry)
    pub fn new(resolver: EligibilityResolver<'a>, mode: SelectionMode) -> Self {
        Self {
            resolver,
            mode,
            state: SelectionState::empty(),
        }
    }

    /// Start from an existing record, in edit mode
    pub fn for_record(resolver: EligibilityResolver<'a>, record: &VaccinationRecord) -> Self {
        Self {
            resolver,
            mode: SelectionMode::Edit,
            state: SelectionState::from_record(record),
        }
    }

    /// Current selection
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Selection mode this form runs under
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Apply an operator event, updating the held state
    pub fn apply(&mut self, event: SelectionEvent) -> &SelectionState {
        self.state = self.transition(&self.state, &event);
        &self.state
    }

    /// Pure transition: compute the next state for an event without
    /// touching the held one. Testable independently of any form state.
    pub fn transition(&self, state: &SelectionState, event: &SelectionEvent) -> SelectionState {
        let catalog = self.resolver.catalog();
        let mut next = state.clone();

        match event {
            SelectionEvent::WindowChanged(window_id) => {
                next.window_id = window_id.clone();
                let window = next.window_id.as_deref().and_then(|id| catalog.window(id));
                if let (Some(window), Some(vaccine_id)) = (window, next.vaccine_id.as_deref())
                    && !window.is_unconstrained()
                    && !window.lists_vaccine(vaccine_id)
                {
                    // The new window rules the current vaccine out entirely
                    next.vaccine_id = None;
                    next.dose = None;
                }
            }
            SelectionEvent::VaccineChanged(vaccine_id) => {
                next.vaccine_id = vaccine_id.clone();
                match next.vaccine_id.as_deref() {
                    None => next.dose = None,
                    Some(vaccine_id) => {
                        let window =
                            next.window_id.as_deref().and_then(|id| catalog.window(id));
                        if let Some(window) = window
                            && !window.is_unconstrained()
                            && !window.lists_vaccine(vaccine_id)
                        {
                            // Previously selected window is incompatible
                            next.window_id = None;
                        }
                        next.dose = self
                            .resolver
                            .doses_for_selection(vaccine_id, next.window_id.as_deref())
                            .first()
                            .copied();
                    }
                }
            }
            SelectionEvent::DoseChanged(dose) => {
                if let Some(vaccine_id) = next.vaccine_id.as_deref()
                    && self.dose_is_free_entry(&next)
                    && catalog
                        .vaccine(vaccine_id)
                        .is_some_and(|v| v.accepts_dose(*dose))
                {
                    next.dose = Some(*dose);
                }
                // Out-of-range or window-constrained dose edits are ignored
            }
        }

        self.normalize(next)
    }

    /// Filtered option lists for the current state
    pub fn options(&self) -> SelectionOptions<'a> {
        self.options_for(&self.state)
    }

    /// Filtered option lists for an arbitrary state
    pub fn options_for(&self, state: &SelectionState) -> SelectionOptions<'a> {
        SelectionOptions {
            windows: self.window_options(state),
            vaccines: self.vaccine_options(state),
            doses: match state.vaccine_id.as_deref() {
                Some(vaccine_id) => self
                    .resolver
                    .doses_for_selection(vaccine_id, state.window_id.as_deref()),
                None => Vec::new(),
            },
        }
    }

    /// Whether the triple is complete enough to submit
    pub fn is_submittable(&self) -> bool {
        self.state.vaccine_id.is_some() && self.state.dose.is_some()
    }

    /// After every transition the dose must be a member of the current
    /// selectable set; otherwise it resets to the first member, never left
    /// dangling.
    fn normalize(&self, mut state: SelectionState) -> SelectionState {
        match state.vaccine_id.as_deref() {
            None => state.dose = None,
            Some(vaccine_id) => {
                let doses = self
                    .resolver
                    .doses_for_selection(vaccine_id, state.window_id.as_deref());
                let keep = state.dose.is_some_and(|d| doses.contains(&d));
                if !keep {
                    state.dose = doses.first().copied();
                }
            }
        }
        state
    }

    /// Free dose entry applies only when no window constrains the vaccine:
    /// no window selected, an unconstrained window, or a window that does
    /// not declare the vaccine.
    fn dose_is_free_entry(&self, state: &SelectionState) -> bool {
        let Some(vaccine_id) = state.vaccine_id.as_deref() else {
            return false;
        };
        state
            .window_id
            .as_deref()
            .and_then(|id| self.resolver.catalog().window(id))
            .and_then(|w| w.declared_doses(vaccine_id))
            .is_none()
    }

    fn window_options(&self, state: &SelectionState) -> Vec<&'a CalendarWindow> {
        let catalog = self.resolver.catalog();
        match (state.vaccine_id.as_deref(), state.dose) {
            (Some(vaccine_id), Some(dose)) => self.resolver.windows_for_vaccine(vaccine_id, dose),
            (Some(vaccine_id), None) => {
                let mut windows: Vec<&CalendarWindow> = catalog
                    .windows()
                    .filter(|w| w.is_unconstrained() || w.lists_vaccine(vaccine_id))
                    .collect();
                sort_by_label(&mut windows);
                windows
            }
            (None, _) => {
                let mut windows: Vec<&CalendarWindow> = catalog.windows().collect();
                sort_by_label(&mut windows);
                windows
            }
        }
    }

    fn vaccine_options(&self, state: &SelectionState) -> Vec<WindowOffer> {
        let catalog = self.resolver.catalog();
        if let Some(window_id) = state.window_id.as_deref()
            && catalog.window(window_id).is_some()
        {
            return self.resolver.vaccines_for_window(window_id, self.mode);
        }
        catalog
            .vaccines()
            .filter_map(|vaccine| {
                let valid_doses: Vec<u32> = match self.mode {
                    SelectionMode::NewRecord => self
                        .resolver
                        .next_schedulable_dose(&vaccine.id)
                        .into_iter()
                        .collect(),
                    SelectionMode::Edit => vaccine.dose_range().collect(),
                };
                if valid_doses.is_empty() {
                    return None;
                }
                Some(WindowOffer {
                    vaccine_id: vaccine.id.clone(),
                    vaccine_name: vaccine.name.clone(),
                    valid_doses,
                })
            })
            .collect()
    }
}
