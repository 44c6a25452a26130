//! Directions mode state machine
//!
//! `Idle -> Editing -> Resolving -> Routing -> Displaying | Failed`.
//! Every submit and every exit issues a new ticket. Transitions that carry
//! an older ticket are ignored, so a slow response can never resurrect a
//! route the user has already moved away from.

use crate::directions::{DirectionsError, RouteResult};
use crate::place::LonLat;
use serde::Serialize;

/// Where the directions flow currently stands
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DirectionsPhase {
    #[default]
    Idle,
    Editing,
    Resolving,
    Routing,
    Displaying { route: RouteResult },
    Failed {
        #[serde(flatten)]
        error: DirectionsError,
    },
}

impl DirectionsPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Resolving => "resolving",
            Self::Routing => "routing",
            Self::Displaying { .. } => "displaying",
            Self::Failed { .. } => "failed",
        }
    }

    /// Waiting on the network
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Resolving | Self::Routing)
    }
}

/// Identifies one directions request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectionsTicket(u64);

/// Origin/destination inputs and the flow's progress
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectionsState {
    pub active: bool,
    pub origin: String,
    pub destination: String,
    pub origin_coords: Option<LonLat>,
    pub destination_coords: Option<LonLat>,
    pub phase: DirectionsPhase,
    #[serde(skip)]
    ticket: u64,
}

impl DirectionsState {
    /// The displayed route, if any
    pub fn route(&self) -> Option<&RouteResult> {
        match &self.phase {
            DirectionsPhase::Displaying { route } => Some(route),
            _ => None,
        }
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&DirectionsError> {
        match &self.phase {
            DirectionsPhase::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// The failure message, if any
    pub fn error(&self) -> Option<&str> {
        self.failure().map(|e| e.message.as_str())
    }

    pub(crate) fn enter(&mut self) {
        self.active = true;
    }

    /// Leave directions mode, dropping inputs and any route in flight
    pub(crate) fn exit(&mut self) {
        self.ticket += 1;
        self.active = false;
        self.origin.clear();
        self.destination.clear();
        self.origin_coords = None;
        self.destination_coords = None;
        self.phase = DirectionsPhase::Idle;
    }

    fn start_editing(&mut self) {
        if matches!(self.phase, DirectionsPhase::Idle | DirectionsPhase::Failed { .. }) {
            self.phase = DirectionsPhase::Editing;
        }
    }

    pub(crate) fn edit_origin(&mut self, text: &str) {
        self.active = true;
        self.origin = text.to_string();
        self.start_editing();
    }

    pub(crate) fn edit_destination(&mut self, text: &str) {
        self.active = true;
        self.destination = text.to_string();
        self.start_editing();
    }

    /// Start a new request; clears the previous route and error
    pub(crate) fn begin(&mut self, origin: &str, destination: &str) -> DirectionsTicket {
        self.ticket += 1;
        self.active = true;
        self.origin = origin.to_string();
        self.destination = destination.to_string();
        self.origin_coords = None;
        self.destination_coords = None;
        self.phase = DirectionsPhase::Resolving;
        DirectionsTicket(self.ticket)
    }

    pub(crate) fn is_current(&self, ticket: DirectionsTicket) -> bool {
        self.active && ticket.0 == self.ticket
    }

    pub(crate) fn resolved(&mut self, ticket: DirectionsTicket, origin: LonLat, destination: LonLat) -> bool {
        if !self.is_current(ticket) || self.phase != DirectionsPhase::Resolving {
            return false;
        }
        self.origin_coords = Some(origin);
        self.destination_coords = Some(destination);
        self.phase = DirectionsPhase::Routing;
        true
    }

    pub(crate) fn display(&mut self, ticket: DirectionsTicket, route: RouteResult) -> bool {
        if !self.is_current(ticket) || self.phase != DirectionsPhase::Routing {
            return false;
        }
        self.phase = DirectionsPhase::Displaying { route };
        true
    }

    pub(crate) fn fail(&mut self, ticket: DirectionsTicket, error: DirectionsError) -> bool {
        if !self.is_current(ticket) || !self.phase.is_pending() {
            return false;
        }
        self.phase = DirectionsPhase::Failed { error };
        true
    }
}
