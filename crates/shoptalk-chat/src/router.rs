//! Regex-based intent routing.
//!
//! Classifies each incoming query against compiled pattern sets for the two
//! specialist domains and resolves to exactly one handler id. Queries that
//! match nothing fall back to the configured default handler, so routing is
//! total: every query gets a specialist, never a refusal.

use regex::Regex;
use tracing::debug;

use shoptalk_core::types::{HandlerId, RouteDecision};

/// A single compiled regex pattern linked to a handler.
struct RoutePattern {
    regex: Regex,
    handler_id: HandlerId,
    base_confidence: f32,
}

/// Confidence assigned when no pattern matched and the default applied.
const FALLBACK_CONFIDENCE: f32 = 0.30;

/// Collection of routing patterns, compiled once and reused per request.
pub struct IntentRouter {
    patterns: Vec<RoutePattern>,
    default_handler: HandlerId,
}

impl IntentRouter {
    /// Create a router with the built-in pattern sets and a default handler
    /// for unmatched queries.
    pub fn new(default_handler: HandlerId) -> Self {
        let mut patterns = Vec::new();

        // =====================================================================
        // Product patterns: pricing, specs, colors, models, availability
        // =====================================================================
        let product_patterns: Vec<(&str, f32)> = vec![
            // Explicit commerce vocabulary (high confidence)
            (r"(?i)\b(?:price|cost|pricing|how\s+much)\b", 0.92),
            (r"(?i)\bgi[aá]\b", 0.92),
            (r"(?i)\b(?:in\s+stock|available|availability|out\s+of\s+stock)\b", 0.90),
            (r"(?i)\bc[oò]n\s+h[aà]ng\b", 0.90),
            // Attributes and specs
            (r"(?i)\b(?:colors?|colour)\b", 0.88),
            (r"(?i)\bm[aà]u(?:\s+s[aắ]c)?\b", 0.88),
            (r"(?i)\b(?:specs?|specifications?|battery|screen|camera|storage|memory|ram)\b", 0.85),
            (r"(?i)\bc[aấ]u\s+h[iì]nh\b", 0.85),
            (r"(?i)\bpin\b", 0.80),
            // Brand and model mentions
            (r"(?i)\b(?:nokia|samsung|iphone|xiaomi|oppo|vivo|realme)\b", 0.82),
            (r"(?i)\b(?:phone|smartphone|handset|model)\b", 0.78),
            (r"(?i)\b[dđ]i[eệ]n\s+tho[aạ]i\b", 0.78),
            (r"(?i)\b(?:warranty\s+on|guarantee\s+on)\b", 0.72),
            // Purchase phrasing (heuristic)
            (r"(?i)\b(?:buy|order|purchase)\b", 0.68),
            (r"(?i)\bmua\b", 0.68),
        ];

        for (pat, conf) in &product_patterns {
            patterns.push(RoutePattern {
                regex: Regex::new(pat).expect("Invalid product regex"),
                handler_id: HandlerId::Product,
                base_confidence: *conf,
            });
        }

        // =====================================================================
        // Shop information patterns: hours, location, contact, policies
        // =====================================================================
        let shop_info_patterns: Vec<(&str, f32)> = vec![
            // Opening hours (high confidence)
            (r"(?i)\b(?:opening\s+hours?|open(?:ing)?\s+time|close\s+time|what\s+time.*(?:open|close)|when.*(?:open|close))\b", 0.93),
            (r"(?i)\bm[aấ]y\s+gi[oờ]\b", 0.93),
            (r"(?i)\bgi[oờ]\s+m[oở]\s+c[uử]a\b", 0.93),
            // Location
            (r"(?i)\b(?:address|location|where\s+(?:is|are)\s+(?:the\s+)?(?:store|shop)|directions?|branch(?:es)?)\b", 0.92),
            (r"(?i)\b[dđ][iị]a\s+ch[iỉ]\b", 0.92),
            (r"(?i)\bchi\s+nh[aá]nh\b", 0.90),
            // Contact
            (r"(?i)\b(?:phone\s+number|hotline|contact|email\s+address|reach\s+you)\b", 0.90),
            (r"(?i)\bli[eê]n\s+h[eệ]\b", 0.90),
            // Policies
            (r"(?i)\b(?:return\s+policy|refund|exchange\s+policy|shipping|delivery|payment\s+methods?)\b", 0.88),
            (r"(?i)\b(?:warranty\s+policy|warranty\s+period)\b", 0.88),
            (r"(?i)\bch[ií]nh\s+s[aá]ch\b", 0.88),
            (r"(?i)\b(?:b[aả]o\s+h[aà]nh|[dđ][oổ]i\s+tr[aả])\b", 0.86),
            // Store-general (heuristic)
            (r"(?i)\b(?:the\s+store|the\s+shop|your\s+store|your\s+shop)\b", 0.70),
            (r"(?i)\bc[uử]a\s+h[aà]ng\b", 0.70),
        ];

        for (pat, conf) in &shop_info_patterns {
            patterns.push(RoutePattern {
                regex: Regex::new(pat).expect("Invalid shop-info regex"),
                handler_id: HandlerId::ShopInfo,
                base_confidence: *conf,
            });
        }

        Self {
            patterns,
            default_handler,
        }
    }

    /// Classify a query against the registered handlers.
    ///
    /// Always returns a decision naming a member of `available`: the
    /// best-scoring match if it is registered, otherwise the default
    /// handler, otherwise the first registered handler. The same query
    /// against the same registry always resolves the same way.
    pub fn route(&self, query: &str, available: &[HandlerId]) -> RouteDecision {
        let mut best: Option<(HandlerId, f32)> = None;

        for pattern in &self.patterns {
            if !available.contains(&pattern.handler_id) {
                continue;
            }
            if pattern.regex.is_match(query) {
                match best {
                    Some((_, conf)) if conf >= pattern.base_confidence => {}
                    _ => best = Some((pattern.handler_id, pattern.base_confidence)),
                }
            }
        }

        let decision = match best {
            Some((handler_id, confidence)) => RouteDecision {
                handler_id,
                confidence,
            },
            None => {
                let handler_id = if available.contains(&self.default_handler) {
                    self.default_handler
                } else {
                    // Registry is never empty in practice; still stay total.
                    available.first().copied().unwrap_or(self.default_handler)
                };
                RouteDecision {
                    handler_id,
                    confidence: FALLBACK_CONFIDENCE,
                }
            }
        };

        debug!(
            handler = %decision.handler_id,
            confidence = decision.confidence,
            "Query routed"
        );
        decision
    }
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new(HandlerId::Product)
    }
}
