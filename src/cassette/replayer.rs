//! Serves recorded interactions back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Recorded calls still waiting to be served, per `port::method`.
pub struct CassetteReplayer {
    pending: HashMap<String, VecDeque<Interaction>>,
}

fn call_name(port: &str, method: &str) -> String {
    format!("{port}::{method}")
}

impl CassetteReplayer {
    /// Queue every interaction of the cassette under its call name.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut pending: HashMap<String, VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            pending
                .entry(call_name(&interaction.port, &interaction.method))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { pending }
    }

    /// Take the next recorded interaction for `port::method`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call was never recorded or every recording of
    /// it has been served.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let call = call_name(port, method);
        match self.pending.get_mut(&call) {
            Some(queue) => queue.pop_front().ok_or_else(|| {
                format!("Cassette exhausted: every recorded {call} call was already served")
            }),
            None => {
                let mut recorded: Vec<&str> = self.pending.keys().map(String::as_str).collect();
                recorded.sort_unstable();
                Err(format!(
                    "Cassette exhausted: {call} was never recorded (cassette holds: [{}])",
                    recorded.join(", ")
                ))
            }
        }
    }
}
