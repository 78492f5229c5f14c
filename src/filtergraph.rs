use std::collections::HashSet;
use std::fmt::Write as _;

use crate::error::{RemixError, RemixResult};

/// One typed node of a filter chain. The set is the vocabulary the variant
/// pipelines actually use; serialization to the engine's textual syntax is a
/// separate step ([`FilterGraph::serialize`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Filter {
    /// Shadow/midtone per-channel shifts.
    ColorBalance {
        rs: f32,
        gs: f32,
        bs: f32,
        rm: f32,
        gm: f32,
        bm: f32,
    },
    /// Brightness/contrast/saturation adjustment; absent fields are left at
    /// the engine default.
    Eq {
        brightness: Option<f32>,
        contrast: Option<f32>,
        saturation: Option<f32>,
    },
    /// Horizontal mirror.
    Hflip,
    Crop {
        w: u32,
        h: u32,
        x: u32,
        y: u32,
    },
    /// -1 on one axis preserves aspect ratio.
    Scale {
        w: i32,
        h: i32,
    },
    /// Video playback-rate change (rate < 1.0 speeds playback up).
    SetPts {
        rate: f32,
    },
    /// Audio tempo change, inverse of the video rate.
    Atempo {
        rate: f32,
    },
    /// Full desaturation (used on flicker bands).
    Desaturate,
    FormatRgba,
    /// Uniform alpha multiplier.
    Alpha {
        opacity: f32,
    },
    /// Solid-color source; must be the first node of a source chain.
    ColorSource {
        rgb: [u8; 3],
        w: u32,
        h: u32,
    },
    /// Per-pixel power-law alpha falloff over a horizontal band: opaque at
    /// the frame edge, transparent past `falloff_px` into the frame.
    GradientAlpha {
        band_h: u32,
        falloff_px: u32,
        exponent: f32,
        from_top: bool,
    },
    /// Composite the second chain input over the first at (x, y).
    Overlay {
        x: i64,
        y: i64,
        shortest: bool,
    },
    /// Fan a stream out to `n` identical copies; must be the last node of
    /// its chain, which then declares `n` output labels.
    Split {
        n: usize,
    },
}

/// Reference to a chain input: a positional input stream or the labeled
/// output of an earlier chain.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum StreamRef {
    Video(usize),
    Audio(usize),
    Label(String),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FilterChain {
    pub inputs: Vec<StreamRef>,
    pub filters: Vec<Filter>,
    pub outputs: Vec<String>,
}

impl FilterChain {
    pub fn new(inputs: Vec<StreamRef>, filters: Vec<Filter>, output: impl Into<String>) -> Self {
        Self {
            inputs,
            filters,
            outputs: vec![output.into()],
        }
    }

    /// Chain ending in a [`Filter::Split`], declaring one label per copy.
    pub fn with_outputs(
        inputs: Vec<StreamRef>,
        filters: Vec<Filter>,
        outputs: Vec<String>,
    ) -> Self {
        Self {
            inputs,
            filters,
            outputs,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FilterGraph {
    pub chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn push(&mut self, chain: FilterChain) {
        self.chains.push(chain);
    }

    /// Highest positional input index referenced anywhere in the graph.
    pub fn max_input_index(&self) -> Option<usize> {
        self.chains
            .iter()
            .flat_map(|c| c.inputs.iter())
            .filter_map(|r| match r {
                StreamRef::Video(i) | StreamRef::Audio(i) => Some(*i),
                StreamRef::Label(_) => None,
            })
            .max()
    }

    /// Structural checks: positional references stay below `input_count`,
    /// labels are produced before they are consumed, no label is produced
    /// twice, and output arity matches any trailing split.
    pub fn validate(&self, input_count: usize) -> RemixResult<()> {
        let mut defined = HashSet::new();

        for chain in &self.chains {
            for input in &chain.inputs {
                match input {
                    StreamRef::Video(i) | StreamRef::Audio(i) => {
                        if *i >= input_count {
                            return Err(RemixError::validation(format!(
                                "filter graph references input {i} but only {input_count} inputs are declared"
                            )));
                        }
                    }
                    StreamRef::Label(l) => {
                        if !defined.contains(l.as_str()) {
                            return Err(RemixError::validation(format!(
                                "filter graph consumes undefined label '{l}'"
                            )));
                        }
                    }
                }
            }

            let first_label = chain.outputs.first().cloned().unwrap_or_default();

            if chain.inputs.is_empty()
                && !matches!(chain.filters.first(), Some(Filter::ColorSource { .. }))
            {
                return Err(RemixError::validation(format!(
                    "chain '{first_label}' has no inputs and is not a color source"
                )));
            }

            let expected_outputs = match chain.filters.last() {
                Some(Filter::Split { n }) => *n,
                _ => 1,
            };
            if chain.outputs.len() != expected_outputs {
                return Err(RemixError::validation(format!(
                    "chain '{first_label}' declares {} outputs but its tail produces {expected_outputs}",
                    chain.outputs.len()
                )));
            }

            for label in &chain.outputs {
                if !defined.insert(label.clone()) {
                    return Err(RemixError::validation(format!(
                        "filter graph produces label '{label}' twice"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Render the engine's textual `filter_complex` syntax.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            for input in &chain.inputs {
                match input {
                    StreamRef::Video(idx) => {
                        let _ = write!(out, "[{idx}:v]");
                    }
                    StreamRef::Audio(idx) => {
                        let _ = write!(out, "[{idx}:a]");
                    }
                    StreamRef::Label(l) => {
                        let _ = write!(out, "[{l}]");
                    }
                }
            }
            let rendered: Vec<String> = chain.filters.iter().map(render_filter).collect();
            out.push_str(&rendered.join(","));
            for label in &chain.outputs {
                let _ = write!(out, "[{label}]");
            }
        }
        out
    }
}

fn render_filter(f: &Filter) -> String {
    match f {
        Filter::ColorBalance {
            rs,
            gs,
            bs,
            rm,
            gm,
            bm,
        } => format!(
            "colorbalance=rs={}:gs={}:bs={}:rm={}:gm={}:bm={}",
            num(*rs),
            num(*gs),
            num(*bs),
            num(*rm),
            num(*gm),
            num(*bm)
        ),
        Filter::Eq {
            brightness,
            contrast,
            saturation,
        } => {
            let mut parts = Vec::new();
            if let Some(b) = brightness {
                parts.push(format!("brightness={}", num(*b)));
            }
            if let Some(c) = contrast {
                parts.push(format!("contrast={}", num(*c)));
            }
            if let Some(s) = saturation {
                parts.push(format!("saturation={}", num(*s)));
            }
            if parts.is_empty() {
                // An adjustment with no fields is a passthrough; `eq=` with
                // no arguments would be rejected by the engine.
                "null".to_string()
            } else {
                format!("eq={}", parts.join(":"))
            }
        }
        Filter::Hflip => "hflip".to_string(),
        Filter::Crop { w, h, x, y } => format!("crop={w}:{h}:{x}:{y}"),
        Filter::Scale { w, h } => format!("scale={w}:{h}"),
        Filter::SetPts { rate } => format!("setpts={}*PTS", num(*rate)),
        Filter::Atempo { rate } => format!("atempo={}", num(*rate)),
        Filter::Desaturate => "hue=s=0".to_string(),
        Filter::FormatRgba => "format=rgba".to_string(),
        Filter::Alpha { opacity } => format!("colorchannelmixer=aa={}", num(*opacity)),
        Filter::ColorSource { rgb, w, h } => format!(
            "color=c=0x{:02x}{:02x}{:02x}:s={w}x{h}",
            rgb[0], rgb[1], rgb[2]
        ),
        Filter::GradientAlpha {
            band_h,
            falloff_px,
            exponent,
            from_top,
        } => {
            let dist = if *from_top {
                format!("({band_h}-Y)")
            } else {
                "Y".to_string()
            };
            format!(
                "geq=a='min(255,255*pow({dist}/{falloff_px},{}))':r='r(X,Y)':g='g(X,Y)':b='b(X,Y)'",
                num(*exponent)
            )
        }
        Filter::Overlay { x, y, shortest } => {
            let mut s = format!("overlay={x}:{y}:format=auto");
            if *shortest {
                s.push_str(":shortest=1");
            }
            s
        }
        Filter::Split { n } => format!("split={n}"),
    }
}

// Two decimal places is enough precision for every grade/tempo parameter we
// emit; fixed width keeps serialized graphs byte-stable across runs.
fn num(v: f32) -> String {
    format!("{v:.2}")
}
