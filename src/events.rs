// StrideWatch: Samples, Detector Events & Commands

// ---------------------------------------------------------------------------
// Sensor Data
// ---------------------------------------------------------------------------

/// Full 6-axis reading from the MPU6050 (m/s² and °/s).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImuReading {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

/// One tick's worth of input for the detectors.
///
/// `gz` is optional because the derivative step policy works from
/// acceleration alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gz: Option<f32>,
}

impl Sample {
    pub fn accel(ax: f32, ay: f32, az: f32) -> Self {
        Self { ax, ay, az, gz: None }
    }

    pub fn with_gyro(ax: f32, ay: f32, az: f32, gz: f32) -> Self {
        Self { ax, ay, az, gz: Some(gz) }
    }

    pub fn axes(&self) -> [f32; 3] {
        [self.ax, self.ay, self.az]
    }
}

impl From<ImuReading> for Sample {
    fn from(r: ImuReading) -> Self {
        Self::with_gyro(r.ax, r.ay, r.az, r.gz)
    }
}

// ---------------------------------------------------------------------------
// Detector output
// ---------------------------------------------------------------------------

/// Emitted on the tick a step boundary is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    /// Counter value including this step.
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallStatus {
    #[default]
    Monitoring,
    FallDetected,
}

impl FallStatus {
    pub fn is_fall(&self) -> bool {
        matches!(self, Self::FallDetected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Monitoring   => "Monitoring...",
            Self::FallDetected => "Fall Detected!",
        }
    }
}

/// Read-only view of the core handed to the display, HTTP and MQTT sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub steps: u32,
    pub fall: FallStatus,
    pub ticks: u64,
}

// ---------------------------------------------------------------------------
// Inbound commands
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Zero the step counter on the next tick.
    Reset,
}

impl Command {
    pub const RESET_LITERAL: &'static [u8] = b"reset";

    /// Only the exact literal is accepted: no trimming, no case folding.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload == Self::RESET_LITERAL {
            Some(Self::Reset)
        } else {
            log::debug!("Ignoring unknown command ({} bytes)", payload.len());
            None
        }
    }
}
