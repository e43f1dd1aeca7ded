pub mod game;
pub mod math;

pub use game::{
    AnswerResult, AnswerSubmission, CheckAnswersRequest, CreateGameRequest, CreatedGameResponse,
    Game, GameDeletedResponse, GameSummary, GameUpdatedResponse, GradeResult, PlayQuestion,
    SubmittedAnswer, TemplateInfo, UpdateGameRequest,
};
pub use math::{
    CreateMathParams, Difficulty, GameDocument, MathDocument, MathEditParams, MathSettings,
    Operation, Question,
};
