use std::fmt;

/// Kind of a literal argument accepted by a script command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// Name of another frame (target or reserved frame).
    Frame,
    /// Floating point literal.
    Float,
    /// Integer literal.
    Int,
}

impl ArgKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Frame => "a frame name",
            Self::Float => "a floating point number",
            Self::Int => "an integer",
        }
    }
}

/// Processing command that may appear on a step line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Subtract a background frame.
    Subtract,
    /// Stretch the frame so its minimum is 0 and maximum 1.
    Normalize,
    /// Multiply by a constant.
    Amplify,
    /// Gamma correction relative to 1.0.
    Gamma,
    /// Add a constant.
    Offset,
    /// Median despeckle with an integer radius.
    DespeckleMedian,
    /// Kuwahara edge-preserving smoothing with an integer half-width.
    Kuwahara,
    /// Four-neighbour sharpening.
    Sharpen,
    /// Unsharp masking: sigma, amount.
    UnsharpMask,
    /// Gaussian blur with the given sigma.
    GaussBlur,
}

impl Command {
    /// Every command, in table order.
    pub const ALL: [Command; 10] = [
        Self::Subtract,
        Self::Normalize,
        Self::Amplify,
        Self::Gamma,
        Self::Offset,
        Self::DespeckleMedian,
        Self::Kuwahara,
        Self::Sharpen,
        Self::UnsharpMask,
        Self::GaussBlur,
    ];

    /// Keyword used in script text.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Subtract => "SUBTRACT",
            Self::Normalize => "NORMALIZE",
            Self::Amplify => "AMPLIFY",
            Self::Gamma => "GAMMA",
            Self::Offset => "OFFSET",
            Self::DespeckleMedian => "DESPECKLE_MEDIAN",
            Self::Kuwahara => "KUWAHARA",
            Self::Sharpen => "SHARPEN",
            Self::UnsharpMask => "UNSHARP_MASK",
            Self::GaussBlur => "GAUSS_BLUR",
        }
    }

    /// Look a keyword up in the command table.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keyword() == keyword)
    }

    /// Argument kinds, in order.
    pub fn signature(self) -> &'static [ArgKind] {
        use ArgKind::{Float, Frame, Int};
        match self {
            Self::Subtract => &[Frame],
            Self::Normalize => &[],
            Self::Amplify | Self::Gamma | Self::Offset | Self::Sharpen | Self::GaussBlur => &[Float],
            Self::DespeckleMedian | Self::Kuwahara => &[Int],
            Self::UnsharpMask => &[Float, Float],
        }
    }

    /// Whether the operator may write its result over its own input.
    pub fn runs_in_place(self) -> bool {
        matches!(
            self,
            Self::Normalize | Self::Amplify | Self::Gamma | Self::Offset
        )
    }

    pub(crate) fn describe_signature(self) -> String {
        let sig = self.signature();
        match sig.len() {
            0 => "no arguments".to_owned(),
            1 => format!("one argument ({})", sig[0].describe()),
            n => {
                let kinds = sig.iter().map(|k| k.describe()).collect::<Vec<_>>();
                format!("{n} arguments ({})", kinds.join(", "))
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
