use std::time::Duration;

use reversi_engine::{
    Challenge, Effect, RandomOpponent, ReversiError, Stone, Ticket, TimerKind, Timings,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Outcome of an action, handed to JS as JSON.
/// `{ "ok": bool, "error"?: string, "effects": [...] }`
#[derive(Debug, Serialize)]
struct ActionResult {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    effects: Vec<Effect>,
}

impl From<Result<Vec<Effect>, ReversiError>> for ActionResult {
    fn from(result: Result<Vec<Effect>, ReversiError>) -> Self {
        match result {
            Ok(effects) => ActionResult {
                ok: true,
                error: None,
                effects,
            },
            Err(e) => ActionResult {
                ok: false,
                error: Some(e.to_string()),
                effects: Vec::new(),
            },
        }
    }
}

fn applied(effects: Vec<Effect>) -> String {
    to_json(ActionResult {
        ok: true,
        error: None,
        effects,
    })
}

fn to_json(result: ActionResult) -> String {
    serde_json::to_string(&result)
        .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"{e}","effects":[]}}"#))
}

/// Browser-side challenge. The page owns the timers: every `schedule` effect
/// becomes a `setTimeout` that calls `fire(kind, serial)`, every `cancel`
/// clears it, and `satisfied` means the user has been verified.
#[wasm_bindgen]
pub struct WasmChallenge {
    inner: Challenge<RandomOpponent>,
}

#[wasm_bindgen]
impl WasmChallenge {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, opponent_delay_ms: u32, success_delay_ms: u32) -> Self {
        let timings = Timings {
            opponent_delay: Duration::from_millis(opponent_delay_ms.into()),
            success_delay: Duration::from_millis(success_delay_ms.into()),
        };
        Self {
            inner: Challenge::new(RandomOpponent::seeded(seed.into()), timings),
        }
    }

    // -- Actions --

    pub fn start(&mut self) -> String {
        applied(self.inner.start())
    }

    pub fn place_stone(&mut self, row: u8, col: u8) -> String {
        to_json(self.inner.place_stone((row, col)).into())
    }

    pub fn pass(&mut self) -> String {
        to_json(self.inner.pass().into())
    }

    pub fn reset(&mut self) -> String {
        applied(self.inner.reset())
    }

    pub fn dismiss(&mut self) -> String {
        applied(self.inner.dismiss())
    }

    /// Called from a `setTimeout` callback. Unknown kinds are reported as errors.
    pub fn fire(&mut self, kind: &str, serial: u32) -> String {
        let kind = match kind.parse::<TimerKind>() {
            Ok(k) => k,
            Err(e) => {
                return to_json(ActionResult {
                    ok: false,
                    error: Some(e),
                    effects: Vec::new(),
                });
            }
        };
        let ticket = Ticket {
            kind,
            serial: serial.into(),
        };
        applied(self.inner.fire(ticket))
    }

    // -- Accessors (WASM-friendly types) --

    /// Full render data as JSON.
    pub fn render_json(&self) -> String {
        serde_json::to_string(&self.inner.render()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn board(&self) -> js_sys::Int8Array {
        js_sys::Int8Array::from(self.inner.engine().board().cells())
    }

    pub fn size(&self) -> u8 {
        self.inner.engine().board().size()
    }

    pub fn stage(&self) -> String {
        self.inner.stage().to_string()
    }

    pub fn status_text(&self) -> String {
        self.inner.status().message(self.inner.timings())
    }

    pub fn is_legal(&self, row: u8, col: u8) -> bool {
        self.inner.engine().current_turn_stone() == Some(Stone::Player)
            && self.inner.engine().is_legal((row, col), Stone::Player)
    }

    pub fn pass_available(&self) -> bool {
        self.inner.render().pass_available
    }

    pub fn player_count(&self) -> u32 {
        self.inner.engine().counts().player
    }

    pub fn opponent_count(&self) -> u32 {
        self.inner.engine().counts().opponent
    }

    pub fn is_satisfied(&self) -> bool {
        self.inner.is_satisfied()
    }
}
