/// Symbolic placement position for an overlay element, resolved against the
/// frame dimensions by [`resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopCenter,
    BottomCenter,
    Center,
    /// Caller-supplied absolute coordinates.
    Custom,
}

/// Resolve an anchor to absolute pixel coordinates for the top-left corner of
/// an `elem_w` x `elem_h` element inside a `frame_w` x `frame_h` frame.
///
/// Results are always clamped into `[0, frame - elem]` on both axes, so an
/// element larger than the frame (or a margin larger than the free space)
/// pins to the frame edge instead of going off-frame. Custom coordinates are
/// clamped the same way.
pub fn resolve(
    anchor: Anchor,
    frame_w: u32,
    frame_h: u32,
    elem_w: u32,
    elem_h: u32,
    margin: u32,
    custom: Option<(i64, i64)>,
) -> (i64, i64) {
    let fw = i64::from(frame_w);
    let fh = i64::from(frame_h);
    let ew = i64::from(elem_w);
    let eh = i64::from(elem_h);
    let m = i64::from(margin);

    let (x, y) = match anchor {
        Anchor::TopLeft => (m, m),
        Anchor::TopRight => (fw - ew - m, m),
        Anchor::BottomLeft => (m, fh - eh - m),
        Anchor::BottomRight => (fw - ew - m, fh - eh - m),
        Anchor::TopCenter => ((fw - ew) / 2, m),
        Anchor::BottomCenter => ((fw - ew) / 2, fh - eh - m),
        Anchor::Center => ((fw - ew) / 2, (fh - eh) / 2),
        Anchor::Custom => custom.unwrap_or((m, m)),
    };

    (clamp_axis(x, fw, ew), clamp_axis(y, fh, eh))
}

fn clamp_axis(v: i64, frame: i64, elem: i64) -> i64 {
    let max = (frame - elem).max(0);
    v.clamp(0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_offset_by_margin() {
        assert_eq!(resolve(Anchor::TopLeft, 1080, 1920, 120, 120, 15, None), (15, 15));
        assert_eq!(
            resolve(Anchor::BottomRight, 1080, 1920, 120, 120, 15, None),
            (1080 - 120 - 15, 1920 - 120 - 15)
        );
    }

    #[test]
    fn left_right_anchors_are_mirror_symmetric() {
        // left.x + right.x == W - w for any margin.
        for margin in [0u32, 10, 15, 40] {
            let (lx, _) = resolve(Anchor::TopLeft, 1080, 1920, 120, 120, margin, None);
            let (rx, _) = resolve(Anchor::TopRight, 1080, 1920, 120, 120, margin, None);
            assert_eq!(lx + rx, 1080 - 120);
        }
    }

    #[test]
    fn center_anchors_split_free_space() {
        let (x, y) = resolve(Anchor::Center, 1080, 1920, 200, 100, 0, None);
        assert_eq!((x, y), ((1080 - 200) / 2, (1920 - 100) / 2));

        let (x, y) = resolve(Anchor::TopCenter, 1080, 1920, 200, 100, 15, None);
        assert_eq!((x, y), ((1080 - 200) / 2, 15));
    }

    #[test]
    fn oversized_element_pins_to_frame_origin() {
        // elem + margin exceeds the frame: clamp to 0 rather than go negative.
        assert_eq!(resolve(Anchor::BottomRight, 100, 100, 120, 120, 10, None), (0, 0));
        assert_eq!(resolve(Anchor::TopRight, 100, 100, 95, 20, 10, None), (0, 10));
    }

    #[test]
    fn custom_coordinates_are_clamped_into_frame() {
        assert_eq!(
            resolve(Anchor::Custom, 1080, 1920, 100, 100, 0, Some((-40, 5000))),
            (0, 1920 - 100)
        );
        assert_eq!(
            resolve(Anchor::Custom, 1080, 1920, 100, 100, 0, Some((300, 400))),
            (300, 400)
        );
    }
}
