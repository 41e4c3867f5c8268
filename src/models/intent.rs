/// Minimum confidence an actionable intent needs before it is acted upon.
pub const CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Intents the bot can act on. Every other intent name the recognizer
/// produces is routed to the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    GetAvailability,
    ScheduleAppointment,
}

impl Intent {
    /// Evaluation order when dispatching a message. First selected intent wins.
    pub const DISPATCH_ORDER: [Intent; 2] = [Intent::GetAvailability, Intent::ScheduleAppointment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::GetAvailability => "GetAvailability",
            Intent::ScheduleAppointment => "ScheduleAppointment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GetAvailability" => Some(Intent::GetAvailability),
            "ScheduleAppointment" => Some(Intent::ScheduleAppointment),
            _ => None,
        }
    }

    pub fn threshold(&self) -> f64 {
        CONFIDENCE_THRESHOLD
    }

    pub fn needs_time_slot(&self) -> bool {
        matches!(self, Intent::ScheduleAppointment)
    }
}

/// An intent that passed selection, with the time the user asked for
/// when the intent takes one.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedIntent {
    pub intent: Intent,
    pub score: f64,
    pub requested_time: Option<String>,
}
