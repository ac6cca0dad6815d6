use crate::client::error::ClientError;
use crate::dataset::error::DatasetError;
use crate::plot::error::PlotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetObsError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Plot(#[from] PlotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_convert_transparently() {
        let err: MetObsError = ClientError::UnknownField("made_up_field".to_string()).into();
        assert!(matches!(err, MetObsError::Client(ClientError::UnknownField(_))));
        assert_eq!(
            err.to_string(),
            ClientError::UnknownField("made_up_field".to_string()).to_string()
        );

        let err: MetObsError = DatasetError::UnknownScaler("robust".to_string()).into();
        assert!(err.to_string().contains("robust"));

        let err: MetObsError = PlotError::EmptySeries("loss").into();
        assert!(matches!(err, MetObsError::Plot(_)));
    }
}
