//! # Quote Core
//!
//! NSE 시세 게이트웨이의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 게이트웨이 전반에서 사용되는 기본 타입을 제공합니다:
//! - 심볼 정규화 (거래소 접미사 처리)
//! - 가격/펀더멘털 스냅샷 및 응답 레코드
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
