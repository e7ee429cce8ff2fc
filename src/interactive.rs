//! 対話式診断モジュール
//!
//! 作物区分を選び、症状を入力して診断を繰り返す。

use crate::error::{AgriAiError, Result};
use crate::recorder::{DiagnosisRecord, DiagnosisRecorder};
use crate::report::print_result;
use agri_ai_common::{diagnose, CropType, DiagnosisQuery, KnowledgeStore};
use dialoguer::{Confirm, Input, Select};

/// 対話アクション
pub enum SessionAction {
    /// 続けて診断
    Continue,
    /// 終了
    Quit,
}

fn prompt_error(e: dialoguer::Error) -> AgriAiError {
    AgriAiError::Prompt(e.to_string())
}

/// 作物区分を選択（前回の選択を初期値にする）
fn select_crop(previous: Option<CropType>) -> Result<CropType> {
    let labels: Vec<&str> = CropType::ALL.iter().map(|c| c.as_str()).collect();
    let default_index = previous
        .and_then(|prev| CropType::ALL.iter().position(|c| *c == prev))
        .unwrap_or(0);

    let index = Select::new()
        .with_prompt("作物を選択")
        .items(&labels)
        .default(default_index)
        .interact()
        .map_err(prompt_error)?;

    Ok(CropType::ALL[index])
}

/// 1回分の診断
fn diagnose_once<S, R>(
    store: &S,
    recorder: Option<&mut R>,
    user_id: Option<&str>,
    crop_type: CropType,
) -> Result<SessionAction>
where
    S: KnowledgeStore + ?Sized,
    R: DiagnosisRecorder,
{
    let symptoms: String = Input::new()
        .with_prompt("症状（例: yellow leaves with brown spots）")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;

    let image_ref: String = Input::new()
        .with_prompt("画像の参照（省略可）")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    let image_ref = Some(image_ref.trim()).filter(|s| !s.is_empty());

    let query = DiagnosisQuery::for_crop(crop_type, &symptoms);
    let result = diagnose(store, &query)?;

    println!();
    print_result(&query, &result);

    if let Some(recorder) = recorder {
        recorder.record(DiagnosisRecord::new(&query, &result, image_ref, user_id))?;
        println!("✔ 診断履歴に保存しました");
    }

    let again = Confirm::new()
        .with_prompt("続けて診断しますか？")
        .default(true)
        .interact()
        .map_err(prompt_error)?;

    Ok(if again {
        SessionAction::Continue
    } else {
        SessionAction::Quit
    })
}

/// 対話式で診断
pub fn run_interactive<S, R>(
    store: &S,
    mut recorder: Option<&mut R>,
    user_id: Option<&str>,
) -> Result<usize>
where
    S: KnowledgeStore + ?Sized,
    R: DiagnosisRecorder,
{
    println!("🌱 症状を入力すると病害の候補を診断します");
    println!("---\n");

    let mut previous: Option<CropType> = None;
    let mut count = 0;

    loop {
        let crop_type = select_crop(previous)?;
        previous = Some(crop_type);

        let action = diagnose_once(store, recorder.as_deref_mut(), user_id, crop_type)?;
        count += 1;

        match action {
            SessionAction::Continue => println!(),
            SessionAction::Quit => break,
        }
    }

    Ok(count)
}
