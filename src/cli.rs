use crate::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agri-ai")]
#[command(about = "作物病害の症状診断・診断履歴管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ナレッジベースJSONファイル（設定・環境変数より優先）
    #[arg(short, long, global = true)]
    pub knowledge: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 症状から病害を診断
    Diagnose {
        /// 作物区分 (maize/beans/vegetables/cassava/rice/tobacco/groundnuts/soybean/cotton/other)
        #[arg(short, long, default_value = "other")]
        crop: String,

        /// 症状の説明
        #[arg(short, long, default_value = "")]
        symptoms: String,

        /// 画像の参照（URLやファイル名）
        #[arg(long)]
        image: Option<String>,

        /// 診断履歴に保存しない
        #[arg(long)]
        no_record: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// JSONファイルの問い合わせを一括診断
    Batch {
        /// 入力JSONファイル（[{cropType, symptoms, imageRef?}]）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（デフォルト: 入力ファイル名.results.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 並列数（0 = 自動）
        #[arg(short, long)]
        jobs: Option<usize>,

        /// 診断履歴に保存しない
        #[arg(long)]
        no_record: bool,
    },

    /// 対話的に診断
    Interactive {
        /// 診断履歴に保存しない
        #[arg(long)]
        no_record: bool,
    },

    /// ナレッジベースの内容を表示
    Knowledge {
        /// 作物区分で絞り込み
        #[arg(short, long)]
        crop: Option<String>,

        /// レコードの不備を検査
        #[arg(long)]
        validate: bool,
    },

    /// 診断履歴を表示
    History {
        /// 作物区分で絞り込み
        #[arg(short, long)]
        crop: Option<String>,

        /// 表示件数
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// 診断履歴をエクスポート
    Export {
        /// 出力形式 (excel/json)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ファイル名（ディレクトリ指定時）
        #[arg(short, long, default_value = "diagnosis-history")]
        title: String,
    },

    /// 設定を表示/編集
    Config {
        /// ナレッジベースのパスを設定
        #[arg(long)]
        set_knowledge: Option<PathBuf>,

        /// 診断履歴に記録するユーザーIDを設定
        #[arg(long)]
        set_user: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
