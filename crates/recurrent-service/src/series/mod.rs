//! Recurring components and the operations that change them: revision,
//! deletion and creation, each producing iTIP-style change messages.

mod component;
mod creator;
mod deleter;
mod instance;
mod itip;
mod reviser;
mod scope;

pub use component::{
    ComponentEnd, ComponentError, ComponentKey, PropertyKind, RecurringComponent, RecurringKind,
    StartAdjustment,
};
pub use creator::{ComponentFactory, Creator, TimeSpan};
pub use deleter::Deleter;
pub use instance::Instance;
pub use itip::{ChangeMessage, Method};
pub use reviser::{Revision, Reviser, shift_rule};
pub use scope::{
    DIALOG_PROPERTIES, EditScope, RRuleStatus, ScopeChoice, ScopeResolver,
    TIME_SPAN_DIALOG_PROPERTIES, requires_dialog, scope_choices,
};
