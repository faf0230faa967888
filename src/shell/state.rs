//! Immutable view state of the invoice preview.
//!
//! Every change goes through [`ViewState::apply`], which consumes the previous
//! state and an event and returns the next state.

use crate::order::Order;

/// The loaded order list together with the user's selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    orders: Vec<Order>,
    selected: usize,
    downloaded: bool,
    last_error: Option<String>,
}

impl Selection {
    /// Selects the first order; `None` when `orders` is empty.
    pub fn new(orders: Vec<Order>) -> Option<Self> {
        if orders.is_empty() {
            return None;
        }
        Some(Self {
            orders,
            selected: 0,
            downloaded: false,
            last_error: None,
        })
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected order. Never fails: a selection is never empty and the
    /// index is kept in range by [`ViewState::apply`].
    pub fn selected(&self) -> &Order {
        &self.orders[self.selected]
    }

    /// Whether the invoice of the current selection has been saved.
    pub fn downloaded(&self) -> bool {
        self.downloaded
    }

    /// Message of the last failed generation for the current selection.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// What the preview shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ViewState {
    /// Orders are being fetched.
    #[default]
    Loading,
    /// The fetch failed; the message is shown to the user.
    LoadFailed { message: String },
    /// The source returned no orders.
    Empty,
    Ready(Selection),
}

/// Inputs that move the view from one state to the next.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
    OrdersLoaded(Vec<Order>),
    LoadFailed(String),
    /// Explicit user selection of the order at this index.
    Select(usize),
    InvoiceSaved,
    InvoiceFailed(String),
    /// The user asked for the list to be fetched again.
    Refresh,
}

impl ViewState {
    /// Returns the state that follows `self` after `event`.
    ///
    /// Out-of-range selections keep the current selection, and generation
    /// events arriving when no order is selected are ignored.
    pub fn apply(self, event: ViewEvent) -> ViewState {
        match (self, event) {
            (_, ViewEvent::OrdersLoaded(orders)) => match Selection::new(orders) {
                Some(selection) => ViewState::Ready(selection),
                None => ViewState::Empty,
            },
            (_, ViewEvent::LoadFailed(message)) => ViewState::LoadFailed { message },
            (_, ViewEvent::Refresh) => ViewState::Loading,
            (ViewState::Ready(mut selection), ViewEvent::Select(index)) => {
                if index < selection.orders.len() {
                    selection.selected = index;
                    selection.downloaded = false;
                    selection.last_error = None;
                }
                ViewState::Ready(selection)
            }
            (ViewState::Ready(mut selection), ViewEvent::InvoiceSaved) => {
                selection.downloaded = true;
                selection.last_error = None;
                ViewState::Ready(selection)
            }
            (ViewState::Ready(mut selection), ViewEvent::InvoiceFailed(message)) => {
                selection.downloaded = false;
                selection.last_error = Some(message);
                ViewState::Ready(selection)
            }
            (state, _) => state,
        }
    }

    /// The selection, when orders are loaded.
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            ViewState::Ready(selection) => Some(selection),
            _ => None,
        }
    }

    /// The order an invoice would be generated for.
    pub fn selected_order(&self) -> Option<&Order> {
        self.selection().map(Selection::selected)
    }
}
