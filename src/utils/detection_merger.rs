//! 检测结果合并工具
//! 多路信号合并：置信度取最大值，广告判定取或，原因取贡献最大置信度的信号

use crate::rule::DetectionResult;

/// 检测结果合并工具
pub struct DetectionMerger;

impl DetectionMerger {
    /// 合并多路检测结果
    ///
    /// 置信度相同时按传入顺序取靠前的信号。空输入返回置信度为0的正片结果。
    pub fn merge(results: Vec<DetectionResult>) -> DetectionResult {
        let is_ad = results.iter().any(|r| r.is_ad);

        let mut best: Option<DetectionResult> = None;
        for result in results {
            let replace = match &best {
                Some(current) => result.confidence > current.confidence,
                None => true,
            };
            if replace {
                best = Some(result);
            }
        }

        let Some(best) = best else {
            return DetectionResult::content(0.0, "无可用信号");
        };

        DetectionResult {
            is_ad,
            confidence: best.confidence.clamp(0.0, 1.0),
            reason: best.reason,
            ad_type: best.ad_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::AdType;

    #[test]
    fn test_merge_takes_max_and_or() {
        let merged = DetectionMerger::merge(vec![
            DetectionResult::content(0.1, "时长"),
            DetectionResult::ad(0.45, "URL", AdType::Unknown),
            DetectionResult::content(0.05, "序列"),
        ]);

        assert!(merged.is_ad);
        assert!((merged.confidence - 0.45).abs() < 1e-9);
        assert_eq!(merged.reason, "URL");
        assert_eq!(merged.ad_type, Some(AdType::Unknown));
    }

    #[test]
    fn test_merge_tie_keeps_first() {
        let merged = DetectionMerger::merge(vec![
            DetectionResult::content(0.3, "第一"),
            DetectionResult::ad(0.3, "第二", AdType::PreRoll),
        ]);

        assert!(merged.is_ad);
        assert_eq!(merged.reason, "第一");
        assert_eq!(merged.ad_type, None);
    }

    #[test]
    fn test_merge_empty() {
        let merged = DetectionMerger::merge(Vec::new());
        assert!(!merged.is_ad);
        assert_eq!(merged.confidence, 0.0);
    }
}
