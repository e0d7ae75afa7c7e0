/// 三幀疊合的 filter_complex
///
/// 左側幀縮到 3/4 寬後補滿整張畫布；中段與結尾幀縮到 3/4 寬並在尾端淡出成透明。
/// 結尾幀貼在水平 1/4 處、底部對齊，中段幀置中。
#[must_use]
pub fn build_composite_filter(width: u32, height: u32) -> String {
    format!(
        "[0:0]scale=3*{width}/4:-1,pad={width}:{height}[s];\
         [1:0]scale=3*{width}/4:-1,fade=out:300:30:alpha=1[m];\
         [2:0]scale=3*{width}/4:-1,fade=out:300:30:alpha=1[e];\
         [s][e]overlay={width}/4:{height}-h[x];\
         [x][m]overlay={width}/8:{height}/2-h/2"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_filter_512() {
        assert_eq!(
            build_composite_filter(512, 512),
            "[0:0]scale=3*512/4:-1,pad=512:512[s];\
             [1:0]scale=3*512/4:-1,fade=out:300:30:alpha=1[m];\
             [2:0]scale=3*512/4:-1,fade=out:300:30:alpha=1[e];\
             [s][e]overlay=512/4:512-h[x];\
             [x][m]overlay=512/8:512/2-h/2"
        );
    }

    #[test]
    fn test_composite_filter_uses_canvas_size() {
        let filter = build_composite_filter(640, 360);
        assert!(filter.contains("pad=640:360[s]"));
        assert!(filter.contains("overlay=640/4:360-h[x]"));
        assert_eq!(filter.matches(';').count(), 4);
    }
}
